use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use crate::net::socket::{timeout_to_millis, Descriptor};
use crate::reactor::{Reactor, MAX_EVENTS};

/// Level-triggered epoll instance.
pub struct EpollReactor {
    epoll: OwnedFd,
    events: Vec<libc::epoll_event>,
}

impl Reactor for EpollReactor {
    fn create() -> io::Result<Self> {
        let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            epoll: unsafe { OwnedFd::from_raw_fd(fd) },
            events: vec![libc::epoll_event { events: 0, u64: 0 }; MAX_EVENTS],
        })
    }

    fn register_read(&mut self, descriptor: &Descriptor) -> io::Result<()> {
        let mut event = libc::epoll_event {
            events: libc::EPOLLIN as u32,
            u64: descriptor.raw() as u64,
        };
        let ret = unsafe {
            libc::epoll_ctl(self.epoll.as_raw_fd(), libc::EPOLL_CTL_ADD, descriptor.raw(), &mut event)
        };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn poll(&mut self, ready: &mut Vec<RawFd>, timeout: Option<Duration>) -> io::Result<()> {
        ready.clear();

        let n = unsafe {
            libc::epoll_wait(
                self.epoll.as_raw_fd(),
                self.events.as_mut_ptr(),
                self.events.len() as libc::c_int,
                timeout_to_millis(timeout),
            )
        };
        if n == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                // A signal cut the wait short; report nothing ready.
                return Ok(());
            }
            return Err(err);
        }

        ready.extend(self.events[..n as usize].iter().map(|event| {
            let token = event.u64;
            token as RawFd
        }));
        Ok(())
    }
}
