//! Sampler thread spawning with FreeRTOS priority and core affinity.
//!
//! On ESP-IDF `std::thread` is a pthread over a FreeRTOS task, and
//! `esp_pthread_set_cfg()` sets the core/priority/stack of the *next*
//! thread created from the calling thread.  The config→spawn pair must
//! therefore not interleave with other thread creation on that thread.

use std::io;
use std::thread::JoinHandle;

/// CPU cores of the ESP32-S3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU), shared with the IDF system tasks.
    Pro = 0,
    /// Core 1 (APP_CPU).
    App = 1,
}

/// Spawn parameters for one sampler task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Null-terminated, e.g. `"smoke\0"`.
    pub name: &'static str,
    pub core: Core,
    /// FreeRTOS priority; higher runs first.
    pub priority: u8,
    pub stack_kb: usize,
}

/// Smoke sampling/publishing task.
pub const SMOKE_TASK: TaskSpec = TaskSpec {
    name: "smoke\0",
    core: Core::App,
    priority: 5,
    stack_kb: 8,
};

/// Flame sampling/publishing task.
pub const FLAME_TASK: TaskSpec = TaskSpec {
    name: "flame\0",
    core: Core::App,
    priority: 4,
    stack_kb: 8,
};

#[cfg(target_os = "espidf")]
pub fn spawn_on_core(task: TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    // SAFETY: the config struct is fully initialised by the IDF helper and
    // `name` is 'static and null-terminated.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = task.core as i32;
        cfg.prio = i32::from(task.priority);
        cfg.stack_size = (task.stack_kb * 1024) as i32;
        cfg.thread_name = task.name.as_ptr().cast();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
        }
    }

    let display_name = task.name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        display_name,
        task.core,
        task.priority,
        task.stack_kb
    );

    std::thread::Builder::new().name(display_name.into()).spawn(f)
}

/// Host fallback: core and priority are ignored.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core(task: TaskSpec, f: impl FnOnce() + Send + 'static) -> io::Result<JoinHandle<()>> {
    let display_name = task.name.trim_end_matches('\0');
    log::info!(
        "Spawning '{}' (sim, pri={} ignored, stack={}KB)",
        display_name,
        task.priority,
        task.stack_kb
    );

    std::thread::Builder::new()
        .name(display_name.into())
        .stack_size(task.stack_kb * 1024)
        .spawn(f)
}
