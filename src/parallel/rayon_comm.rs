//! Shared-memory communicator.
//!
//! All threads share one address space, so every local reduction over a field is already global
//! and the collective sum is the identity. Creating a [`RayonComm`] sizes the global Rayon pool
//! that the vector-space reductions and the threaded dense backend run on.

pub struct RayonComm;

impl RayonComm {
    /// Build the global pool with one thread per logical CPU (no-op if it already exists).
    pub fn new() -> Self {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
        RayonComm
    }
}

impl Default for RayonComm {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Comm for RayonComm {
    fn rank(&self) -> usize {
        0
    }
    /// Worker threads in the global pool.
    fn size(&self) -> usize {
        rayon::current_num_threads()
    }
    fn barrier(&self) {
        rayon::scope(|_| {});
    }
    fn all_reduce(&self, x: f64) -> f64 {
        x
    }
}
