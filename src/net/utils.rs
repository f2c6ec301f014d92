use crate::error::{Error, Result};

use libc::{AF_INET, F_GETFL, F_SETFL, O_NONBLOCK, fcntl, in_addr, sockaddr_in};
use std::io;
use std::mem;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::os::fd::RawFd;

pub(crate) fn parse_sockaddr(address: &str) -> Result<sockaddr_in> {
    let parsed: SocketAddrV4 = address
        .parse()
        .map_err(|_| Error::InvalidAddress(address.to_string()))?;

    Ok(socketaddr_to_sockaddr(&parsed))
}

pub(crate) fn socketaddr_to_sockaddr(address: &SocketAddrV4) -> sockaddr_in {
    let mut raw: sockaddr_in = unsafe { mem::zeroed() };

    raw.sin_family = AF_INET as libc::sa_family_t;
    raw.sin_port = address.port().to_be();
    raw.sin_addr = in_addr {
        s_addr: u32::from(*address.ip()).to_be(),
    };

    #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    ))]
    {
        raw.sin_len = mem::size_of::<sockaddr_in>() as u8;
    }

    raw
}

pub(crate) fn sockaddr_to_socketaddr(address: &sockaddr_in) -> SocketAddr {
    let ip = Ipv4Addr::from(u32::from_be(address.sin_addr.s_addr));
    let port = u16::from_be(address.sin_port);

    SocketAddr::V4(SocketAddrV4::new(ip, port))
}

pub(crate) fn set_nonblocking(file_descriptor: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(file_descriptor, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let ret = unsafe { fcntl(file_descriptor, F_SETFL, flags | O_NONBLOCK) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}
