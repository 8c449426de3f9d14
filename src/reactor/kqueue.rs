use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;
use std::time::Duration;

use crate::net::socket::Descriptor;
use crate::reactor::{Reactor, MAX_EVENTS};

/// kqueue instance watching `EVFILT_READ`.
pub struct KqueueReactor {
    kq: OwnedFd,
    events: Vec<libc::kevent>,
}

fn read_filter(fd: RawFd) -> libc::kevent {
    let mut event: libc::kevent = unsafe { mem::zeroed() };
    event.ident = fd as libc::uintptr_t;
    event.filter = libc::EVFILT_READ;
    event.flags = libc::EV_ADD;
    event
}

impl Reactor for KqueueReactor {
    fn create() -> io::Result<Self> {
        let fd = unsafe { libc::kqueue() };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }
        let kq = unsafe { OwnedFd::from_raw_fd(fd) };
        if unsafe { libc::fcntl(kq.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            kq,
            events: vec![unsafe { mem::zeroed() }; MAX_EVENTS],
        })
    }

    fn register_read(&mut self, descriptor: &Descriptor) -> io::Result<()> {
        // Submitted on its own so a bad change is reported to this caller
        // rather than surfacing inside a later poll.
        let change = read_filter(descriptor.raw());
        let ret = unsafe { libc::kevent(self.kq.as_raw_fd(), &change, 1, ptr::null_mut(), 0, ptr::null()) };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn poll(&mut self, ready: &mut Vec<RawFd>, timeout: Option<Duration>) -> io::Result<()> {
        ready.clear();

        let timespec = timeout.map(|t| libc::timespec {
            tv_sec: t.as_secs() as libc::time_t,
            tv_nsec: t.subsec_nanos() as libc::c_long,
        });
        let timespec_ptr = timespec
            .as_ref()
            .map_or(ptr::null(), |ts| ts as *const libc::timespec);

        let n = unsafe {
            libc::kevent(
                self.kq.as_raw_fd(),
                ptr::null(),
                0,
                self.events.as_mut_ptr(),
                self.events.len() as libc::c_int,
                timespec_ptr,
            )
        };
        if n == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        for event in &self.events[..n as usize] {
            if event.flags & libc::EV_ERROR != 0 {
                tracing::warn!(fd = event.ident as i64, errno = event.data as i64, "kqueue reported an error event");
                continue;
            }
            ready.push(event.ident as RawFd);
        }
        Ok(())
    }
}
