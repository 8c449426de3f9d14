//! Descriptor-level socket primitives.
//!
//! Everything that touches raw `sockaddr` layouts or byte order lives here.
//! Callers deal in [`Endpoint`] values with host-order ports; the
//! per-platform wire structure differences stay inside the `wire` module.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use crate::net::address::{Address, Endpoint, Port};

/// An owned OS socket handle.
///
/// The handle is closed exactly once, when the `Descriptor` is dropped.
#[derive(Debug)]
pub struct Descriptor {
    fd: OwnedFd,
}

/// Readiness to wait for in [`Descriptor::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
}

impl Descriptor {
    /// Takes ownership of a raw descriptor.
    ///
    /// # Safety
    ///
    /// `fd` must be an open descriptor not owned by anything else.
    pub unsafe fn from_raw(fd: RawFd) -> Self {
        Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        }
    }

    pub fn raw(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Reads whatever is available without blocking.
    ///
    /// `Ok(0)` means the peer closed its side. A non-blocking socket with no
    /// pending data yields `ErrorKind::WouldBlock`.
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = unsafe { libc::recv(self.raw(), buf.as_mut_ptr().cast(), buf.len(), 0) };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    /// Writes as much of `buf` as the socket accepts right now.
    pub fn send(&self, buf: &[u8]) -> io::Result<usize> {
        loop {
            let n = unsafe {
                libc::send(self.raw(), buf.as_ptr().cast(), buf.len(), wire::SEND_FLAGS)
            };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    /// Blocks until the descriptor is ready for `interest` or `timeout`
    /// elapses. `None` waits indefinitely.
    ///
    /// Returns `Ok(false)` on timeout.
    pub fn wait(&self, interest: Interest, timeout: Option<Duration>) -> io::Result<bool> {
        let events = match interest {
            Interest::Readable => libc::POLLIN,
            Interest::Writable => libc::POLLOUT,
        };
        let mut pfd = libc::pollfd {
            fd: self.raw(),
            events,
            revents: 0,
        };
        let timeout_ms = timeout_to_millis(timeout);

        loop {
            let n = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if n >= 0 {
                return Ok(n > 0);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn set_nonblocking(&self) -> io::Result<()> {
        let flags = cvt(unsafe { libc::fcntl(self.raw(), libc::F_GETFL) })?;
        cvt(unsafe { libc::fcntl(self.raw(), libc::F_SETFL, flags | libc::O_NONBLOCK) })?;
        Ok(())
    }

    fn set_cloexec(&self) -> io::Result<()> {
        cvt(unsafe { libc::fcntl(self.raw(), libc::F_SETFD, libc::FD_CLOEXEC) })?;
        Ok(())
    }

    fn set_int_option(&self, level: libc::c_int, name: libc::c_int, value: libc::c_int) -> io::Result<()> {
        cvt(unsafe {
            libc::setsockopt(
                self.raw(),
                level,
                name,
                (&value as *const libc::c_int).cast(),
                mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        })?;
        Ok(())
    }
}

impl AsRawFd for Descriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.raw()
    }
}

/// Milliseconds for `poll(2)`-style timeouts, `-1` meaning forever.
pub(crate) fn timeout_to_millis(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        Some(t) => t.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
        None => -1,
    }
}

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

/// Reports whether the host stores integers least-significant byte first.
///
/// Checked at runtime by looking at how a known byte pair reads back.
pub fn host_is_little_endian() -> bool {
    u16::from_ne_bytes([0, 1]) == 0x0100
}

/// Converts a port between host and network byte order for a host of the
/// given endianness. The conversion is its own inverse.
pub fn convert_port_order(port: Port, little_endian_host: bool) -> Port {
    if little_endian_host {
        ((port & 0xff) << 8) | ((port >> 8) & 0xff)
    } else {
        port
    }
}

/// Host to network order. The only place outgoing ports are converted.
pub fn host_to_network(port: Port) -> Port {
    convert_port_order(port, host_is_little_endian())
}

/// Network to host order. The only place incoming ports are converted.
pub fn network_to_host(port: Port) -> Port {
    convert_port_order(port, host_is_little_endian())
}

/// A raw socket address ready to hand to `bind(2)`.
enum WireAddress {
    V4(libc::sockaddr_in),
    V6(libc::sockaddr_in6),
}

impl WireAddress {
    fn marshal(endpoint: &Endpoint) -> Self {
        let address = endpoint.address();
        let port = host_to_network(endpoint.port());

        match address.raw().len() {
            4 => {
                let mut sin: libc::sockaddr_in = unsafe { mem::zeroed() };
                wire::set_family_v4(&mut sin);
                sin.sin_port = port;
                let mut octets = [0u8; 4];
                octets.copy_from_slice(address.raw());
                sin.sin_addr.s_addr = u32::from_ne_bytes(octets);
                WireAddress::V4(sin)
            }
            _ => {
                let mut sin6: libc::sockaddr_in6 = unsafe { mem::zeroed() };
                wire::set_family_v6(&mut sin6);
                sin6.sin6_port = port;
                sin6.sin6_addr.s6_addr.copy_from_slice(address.raw());
                WireAddress::V6(sin6)
            }
        }
    }

    fn domain(&self) -> libc::c_int {
        match self {
            WireAddress::V4(_) => libc::AF_INET,
            WireAddress::V6(_) => libc::AF_INET6,
        }
    }

    fn as_sockaddr(&self) -> (*const libc::sockaddr, libc::socklen_t) {
        match self {
            WireAddress::V4(sin) => (
                (sin as *const libc::sockaddr_in).cast(),
                mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
            ),
            WireAddress::V6(sin6) => (
                (sin6 as *const libc::sockaddr_in6).cast(),
                mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t,
            ),
        }
    }
}

/// Reads an endpoint back out of a kernel-filled `sockaddr_storage`.
fn unmarshal(storage: &libc::sockaddr_storage) -> Option<Endpoint> {
    match storage.ss_family as libc::c_int {
        libc::AF_INET => {
            let sin = unsafe { &*(storage as *const libc::sockaddr_storage).cast::<libc::sockaddr_in>() };
            let address = Address::from_raw(&sin.sin_addr.s_addr.to_ne_bytes())?;
            Some(Endpoint::new(address, network_to_host(sin.sin_port)))
        }
        libc::AF_INET6 => {
            let sin6 = unsafe { &*(storage as *const libc::sockaddr_storage).cast::<libc::sockaddr_in6>() };
            let address = Address::from_raw(&sin6.sin6_addr.s6_addr)?;
            Some(Endpoint::new(address, network_to_host(sin6.sin6_port)))
        }
        _ => None,
    }
}

/// Creates a non-blocking socket bound to `endpoint` and listening with
/// the given backlog.
///
/// Any failing step is logged and yields `None`; a partially set up
/// descriptor is closed on the way out.
pub fn create_listening_socket(endpoint: &Endpoint, backlog: i32) -> Option<Descriptor> {
    let wire_address = WireAddress::marshal(endpoint);

    let fd = unsafe { libc::socket(wire_address.domain(), libc::SOCK_STREAM, 0) };
    if fd == -1 {
        tracing::warn!(%endpoint, error = %io::Error::last_os_error(), "socket() failed");
        return None;
    }
    let descriptor = unsafe { Descriptor::from_raw(fd) };

    let setup = descriptor
        .set_cloexec()
        .and_then(|_| descriptor.set_int_option(libc::SOL_SOCKET, libc::SO_REUSEADDR, 1))
        .and_then(|_| {
            let (addr, len) = wire_address.as_sockaddr();
            cvt(unsafe { libc::bind(descriptor.raw(), addr, len) })
        })
        .and_then(|_| cvt(unsafe { libc::listen(descriptor.raw(), backlog) }))
        .and_then(|_| descriptor.set_nonblocking());

    match setup {
        Ok(()) => Some(descriptor),
        Err(e) => {
            tracing::warn!(%endpoint, error = %e, "Failed to set up listening socket");
            None
        }
    }
}

/// Accepts one pending connection on a non-blocking listening socket.
///
/// Returns the new descriptor (non-blocking, close-on-exec) and the peer
/// endpoint. `None` when nothing is pending or accept fails; failures are
/// logged.
pub fn accept_connection(listener: &Descriptor, local: &Endpoint) -> Option<(Descriptor, Endpoint)> {
    match try_accept(listener) {
        Ok(accepted) => accepted,
        Err(e) => {
            tracing::warn!(%local, error = %e, "accept() failed");
            None
        }
    }
}

/// Like [`accept_connection`] but hands the failure back to the caller.
///
/// `Ok(None)` means nothing is pending.
pub fn try_accept(listener: &Descriptor) -> io::Result<Option<(Descriptor, Endpoint)>> {
    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

    let fd = loop {
        let fd = unsafe {
            libc::accept(
                listener.raw(),
                (&mut storage as *mut libc::sockaddr_storage).cast(),
                &mut len,
            )
        };
        if fd != -1 {
            break fd;
        }
        let err = io::Error::last_os_error();
        match err.kind() {
            io::ErrorKind::Interrupted => continue,
            io::ErrorKind::WouldBlock => return Ok(None),
            _ => return Err(err),
        }
    };
    let descriptor = unsafe { Descriptor::from_raw(fd) };

    descriptor.set_nonblocking()?;
    descriptor.set_cloexec()?;
    wire::suppress_sigpipe(&descriptor)?;

    let remote = unmarshal(&storage).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("peer has unknown address family {}", storage.ss_family),
        )
    })?;

    Ok(Some((descriptor, remote)))
}

/// Whether an accept failure means the process or system ran out of
/// descriptors. The pending connection then stays queued.
pub fn is_descriptor_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EMFILE) | Some(libc::ENFILE))
}

/// Opens a spare descriptor on `/dev/null`.
///
/// Closing it frees one slot so a queued connection can be accepted and
/// refused when the process is otherwise out of descriptors.
pub fn reserve_descriptor() -> io::Result<Descriptor> {
    let file = std::fs::File::open("/dev/null")?;
    Ok(Descriptor {
        fd: OwnedFd::from(file),
    })
}

/// The endpoint a socket is bound to, with the kernel-assigned port when
/// it was bound to port 0.
pub fn local_endpoint(descriptor: &Descriptor) -> io::Result<Endpoint> {
    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;
    cvt(unsafe {
        libc::getsockname(
            descriptor.raw(),
            (&mut storage as *mut libc::sockaddr_storage).cast(),
            &mut len,
        )
    })?;
    unmarshal(&storage).ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown address family"))
}

/// Linux-family layout: a 16-bit family field and no length byte.
#[cfg(any(target_os = "linux", target_os = "android"))]
mod wire {
    use super::Descriptor;
    use std::io;

    pub(super) const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;

    pub(super) fn set_family_v4(sin: &mut libc::sockaddr_in) {
        sin.sin_family = libc::AF_INET as u16;
    }

    pub(super) fn set_family_v6(sin6: &mut libc::sockaddr_in6) {
        sin6.sin6_family = libc::AF_INET6 as u16;
    }

    pub(super) fn suppress_sigpipe(_descriptor: &Descriptor) -> io::Result<()> {
        Ok(())
    }
}

/// BSD-family layout: a leading length byte and an 8-bit family field.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
mod wire {
    use super::Descriptor;
    use std::io;
    use std::mem;

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    pub(super) const SEND_FLAGS: libc::c_int = 0;
    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    pub(super) const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;

    pub(super) fn set_family_v4(sin: &mut libc::sockaddr_in) {
        sin.sin_len = mem::size_of::<libc::sockaddr_in>() as u8;
        sin.sin_family = libc::AF_INET as u8;
    }

    pub(super) fn set_family_v6(sin6: &mut libc::sockaddr_in6) {
        sin6.sin6_len = mem::size_of::<libc::sockaddr_in6>() as u8;
        sin6.sin6_family = libc::AF_INET6 as u8;
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    pub(super) fn suppress_sigpipe(descriptor: &Descriptor) -> io::Result<()> {
        descriptor.set_int_option(libc::SOL_SOCKET, libc::SO_NOSIGPIPE, 1)
    }

    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    pub(super) fn suppress_sigpipe(_descriptor: &Descriptor) -> io::Result<()> {
        Ok(())
    }
}
