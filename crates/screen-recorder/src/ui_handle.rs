use crate::UiCommand;

use std::sync::{Arc, Mutex};

use tao::event_loop::EventLoopProxy;
use tracing::debug;

/// Cloneable, thread-safe sender into the main thread's event loop.
#[derive(Clone)]
pub struct UiHandle {
    proxy: Arc<Mutex<EventLoopProxy<UiCommand>>>,
}

impl UiHandle {
    /// Wrap the event loop proxy.
    pub fn new(proxy: EventLoopProxy<UiCommand>) -> Self {
        Self {
            proxy: Arc::new(Mutex::new(proxy)),
        }
    }

    /// Send a command; returns false once the event loop has exited.
    pub fn send(&self, command: UiCommand) -> bool {
        let proxy = self.proxy.lock().unwrap_or_else(|e| e.into_inner());
        match proxy.send_event(command) {
            Ok(()) => true,
            Err(_) => {
                debug!("UI event loop closed, command dropped");
                false
            }
        }
    }
}
