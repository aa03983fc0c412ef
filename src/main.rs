//! cube-hunt worker process.
//!
//! Configuration comes from the environment:
//!   CONTAINER_ID      worker id, the residue class searched (default 0)
//!   TOTAL_CONTAINERS  fleet size, the stride of the walk (default 1000)
//!   CHECKPOINT_FILE   cursor record path (default checkpoint_<id>.json)
//!   SOLUTIONS_FILE    shared append-only log (default solutions.txt)
//!   CHECK_INTERVAL    steps between flushes (default 5000)
//!   RANDOM_SEED       base seed for witness/rho sampling (default 42)
//!
//! SIGINT/SIGTERM stop the walk at the next step boundary after a final
//! checkpoint flush; exit code 0. Bad configuration or an unwritable
//! checkpoint path exits nonzero before any step runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cube_hunt::candidates::CubeFamily;
use cube_hunt::config::Config;
use cube_hunt::worker::Worker;

fn main() {
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        }) {
            eprintln!("Error: cannot install signal handler: {}", e);
            std::process::exit(1);
        }
    }

    let mut worker = match Worker::new(config, CubeFamily::production(), Arc::clone(&stop)) {
        Ok(worker) => worker,
        Err(e) => {
            eprintln!("Error: checkpoint file is not writable: {}", e);
            std::process::exit(1);
        }
    };

    worker.run();
    println!("stopped; cursor flushed");
}
