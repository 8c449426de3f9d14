//! Readiness notification.
//!
//! One contract, [`Reactor`], with a backend per platform family:
//!
//! - **`epoll`**: Linux and Android. Interest is registered once and
//!   persists; each poll asks what is ready.
//! - **`kqueue`**: macOS, iOS and the BSDs. Interest is submitted as a
//!   change list; each poll retrieves triggered events.
//!
//! [`PlatformReactor`] names the backend for the build target, so the
//! server loop never branches on platform itself. Both backends drop
//! interest automatically when a descriptor is closed.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use crate::net::socket::Descriptor;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod epoll;

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
pub mod kqueue;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub type PlatformReactor = epoll::EpollReactor;

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
pub type PlatformReactor = kqueue::KqueueReactor;

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
compile_error!("burrow needs epoll or kqueue; this target has neither");

/// Upper bound on events collected by a single poll.
pub const MAX_EVENTS: usize = 256;

/// A readiness notification context.
pub trait Reactor: Sized {
    /// Creates a fresh notification context.
    fn create() -> io::Result<Self>;

    /// Starts watching `descriptor` for readability.
    fn register_read(&mut self, descriptor: &Descriptor) -> io::Result<()>;

    /// Waits until at least one registered descriptor is readable and
    /// replaces the contents of `ready` with those descriptors.
    ///
    /// `None` blocks indefinitely. A timeout leaves `ready` empty.
    fn poll(&mut self, ready: &mut Vec<RawFd>, timeout: Option<Duration>) -> io::Result<()>;
}
