//! MPI-based communicator.
//!
//! Wraps the MPI world communicator so that [`DistributedSpace`](crate::core::DistributedSpace)
//! can sum local inner products across processes. Only available with the `mpi` feature.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "mpi")]
//! # {
//! use gmresdr::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().expect("MPI already initialized");
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! comm.barrier();
//! # }
//! ```
use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

/// MPI communicator wrapper; keeps the universe alive for as long as the communicator is used.
pub struct MpiComm {
    _universe: Universe,
    /// The MPI world communicator (all processes in the job).
    pub world: SimpleCommunicator,
    pub rank: usize,
    pub size: usize,
}

impl MpiComm {
    /// Initializes MPI. Returns `None` if MPI was already initialized.
    pub fn new() -> Option<Self> {
        let universe = mpi::initialize()?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Some(MpiComm { _universe: universe, world, rank, size })
    }
}

impl super::Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
    fn barrier(&self) {
        self.world.barrier();
    }
    fn all_reduce(&self, x: f64) -> f64 {
        let mut y = x;
        self.world.all_reduce_into(&x, &mut y, SystemOperation::sum());
        y
    }
}
