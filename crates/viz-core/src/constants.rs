// Shared animation and layout tuning constants for every widget kind.

// Particle field
pub const PARTICLE_SPREAD: f32 = 10.0; // edge length of the bounding cube
pub const MAX_PARTICLE_COUNT: usize = 100_000;
pub const PARTICLE_ROTATION_SPEED: f32 = 0.05; // radians per second about +Y
pub const PARTICLE_POINTER_BLEND: f32 = 0.1; // fraction of the gap closed per frame
pub const PARTICLE_POINTER_GAIN: f32 = 0.2; // pointer -> target rotation (radians)
pub const PARTICLE_DRIFT_AMPLITUDE: f32 = 0.001; // per-frame vertical offset
pub const PARTICLE_DRIFT_PHASE_STEP: f32 = 0.1; // phase offset between points
pub const PARTICLE_SIZE: f32 = 0.05;
pub const PARTICLE_OPACITY: f32 = 0.8;
pub const PARTICLE_SATURATION: f32 = 0.7;
pub const PARTICLE_LIGHTNESS: f32 = 0.6;

// Tech orbit
pub const ORBIT_RADIUS: f32 = 3.0;
pub const ORBIT_RING_OPACITY: f32 = 0.1;
pub const ORBIT_RING_SEGMENTS: u32 = 64;
pub const ORBIT_MARKER_SIZE: f32 = 0.5;
pub const ORBIT_SPIN_Y: f32 = 0.2;
pub const ORBIT_SPIN_X: f32 = 0.05;
pub const ORBIT_POINTER_GAIN: f32 = 0.3;
pub const ORBIT_BOB_AMPLITUDE: f32 = 0.1;
pub const ORBIT_BOB_SPEED: f32 = 2.0;

// Textured sphere
pub const SPHERE_RADIUS: f32 = 2.0;
pub const SPHERE_SEGMENTS: u32 = 32;
pub const SPHERE_WIREFRAME_SCALE: f32 = 1.01;
pub const SPHERE_WIREFRAME_OPACITY: f32 = 0.15;
pub const SPHERE_SPIN_Y: f32 = 0.3;
pub const SPHERE_SPIN_X: f32 = 0.1;

// Wireframe cube
pub const CUBE_SIZE: f32 = 2.0;
pub const CUBE_FILL_OPACITY: f32 = 0.3;
pub const CUBE_SPIN: f32 = 0.5;
pub const CUBE_POINTER_GAIN: f32 = 0.5;
pub const CUBE_HUE_SPEED: f32 = 0.1; // hue turns per second, wrapped modulo 1
pub const CUBE_EDGE_HUE_OFFSET: f32 = 0.5;
pub const CUBE_SATURATION: f32 = 0.7;
pub const CUBE_LIGHTNESS: f32 = 0.5;

// Bloom background
pub const BLOOM_PARTICLE_COUNT: usize = 1000;
pub const BLOOM_PARTICLE_SPREAD: f32 = 20.0;
pub const BLOOM_PARTICLE_SPIN: f32 = 0.02;
pub const BLOOM_POLYHEDRA_COUNT: usize = 5;
pub const BLOOM_POLYHEDRA_SPREAD: f32 = 10.0;
pub const BLOOM_POLYHEDRA_SCALE_MIN: f32 = 0.5;
pub const BLOOM_POLYHEDRA_SCALE_MAX: f32 = 1.5;
pub const BLOOM_POLYHEDRA_OPACITY: f32 = 0.15;
pub const BLOOM_POLYHEDRA_SPIN_MAX: f32 = 0.01; // radians per frame
pub const BLOOM_CAMERA_EASE: f32 = 0.05; // fraction of the gap closed per frame
pub const BLOOM_CAMERA_POINTER_GAIN: f32 = 2.0;
pub const BLOOM_CAMERA_Z: f32 = 10.0;
pub const BLOOM_STRENGTH: f32 = 1.5;
pub const BLOOM_RADIUS: f32 = 0.4;
pub const BLOOM_THRESHOLD: f32 = 0.85;

// Largest texture side accepted (WebGPU default limit)
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

// Camera defaults
pub const CAMERA_FOVY_DEGREES: f32 = 75.0;
pub const CAMERA_Z: f32 = 5.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Lights
pub const AMBIENT_INTENSITY: f32 = 0.5;
pub const DIRECTIONAL_INTENSITY: f32 = 1.0;
