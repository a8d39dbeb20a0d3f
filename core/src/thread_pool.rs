/*
 * thread_pool.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Vnet, a blocking networking library.
 *
 * Vnet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Vnet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Vnet.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Fixed-size worker pool: a mutex-guarded job queue drained by blocking
//! workers, shut down cooperatively on drop. Offered to callers that want
//! to parallelize connection handling; nothing in the library uses it
//! internally.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    jobs: VecDeque<Job>,
    active: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    condvar: Condvar,
}

pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    /// Pool sized to the machine's available parallelism.
    pub fn new() -> io::Result<ThreadPool> {
        let count = thread::available_parallelism().map(usize::from).unwrap_or(1);
        ThreadPool::with_threads(count)
    }

    /// Pool with exactly `thread_count` workers; `thread_count` must be at
    /// least 1.
    pub fn with_threads(thread_count: usize) -> io::Result<ThreadPool> {
        if thread_count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot create a thread pool with zero threads",
            ));
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                jobs: VecDeque::new(),
                active: true,
            }),
            condvar: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(thread_count);
        for _ in 0..thread_count {
            let shared = Arc::clone(&shared);
            workers.push(thread::spawn(move || worker_loop(&shared)));
        }

        Ok(ThreadPool { shared, workers })
    }

    /// Queue a job; a blocked worker picks it up.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().unwrap();
        state.jobs.push_back(Box::new(job));
        self.shared.condvar.notify_one();
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Jobs still queued (not the ones currently running).
    pub fn job_count(&self) -> usize {
        self.shared.state.lock().unwrap().jobs.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.state.lock().unwrap().active = false;
        self.shared.condvar.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        let job = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if !state.active {
                    return;
                }
                if let Some(job) = state.jobs.pop_front() {
                    break job;
                }
                state = shared.condvar.wait(state).unwrap();
            }
        };
        job();
    }
}
