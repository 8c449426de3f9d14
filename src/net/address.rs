use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};

/// TCP port in host byte order.
///
/// Conversion to network order happens only inside [`crate::net::socket`].
pub type Port = u16;

/// Address family of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    IPv4,
    IPv6,
}

impl AddressFamily {
    /// Number of raw address bytes for this family.
    pub fn raw_len(&self) -> usize {
        match self {
            AddressFamily::IPv4 => 4,
            AddressFamily::IPv6 => 16,
        }
    }
}

/// An IP address as raw network-order bytes, optionally remembering the
/// hostname it was resolved from.
///
/// Two addresses are equal when family and bytes match; the hostname is
/// informational only.
#[derive(Debug, Clone)]
pub struct Address {
    family: AddressFamily,
    raw: [u8; 16],
    hostname: Option<String>,
}

impl Address {
    /// Builds an address from 4 (IPv4) or 16 (IPv6) raw bytes.
    ///
    /// Returns `None` for any other length.
    ///
    /// # Example
    ///
    /// ```
    /// # use burrow::net::address::{Address, AddressFamily};
    /// let addr = Address::from_raw(&[127, 0, 0, 1]).unwrap();
    /// assert_eq!(addr.family(), AddressFamily::IPv4);
    /// assert!(Address::from_raw(&[1, 2, 3]).is_none());
    /// ```
    pub fn from_raw(bytes: &[u8]) -> Option<Self> {
        let family = match bytes.len() {
            4 => AddressFamily::IPv4,
            16 => AddressFamily::IPv6,
            _ => return None,
        };

        let mut raw = [0u8; 16];
        raw[..bytes.len()].copy_from_slice(bytes);

        Some(Self {
            family,
            raw,
            hostname: None,
        })
    }

    /// Resolves `hostname` and returns its first address.
    ///
    /// Literal IP addresses are accepted as well. The resolved address keeps
    /// the hostname for display purposes.
    pub fn resolve(hostname: &str) -> Option<Self> {
        let resolved = (hostname, 0)
            .to_socket_addrs()
            .map_err(|e| tracing::debug!(hostname, error = %e, "Hostname resolution failed"))
            .ok()?
            .next()?;

        let mut address = Self::from(resolved.ip());
        address.hostname = Some(hostname.to_string());
        Some(address)
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The raw network-order bytes, 4 or 16 long depending on the family.
    pub fn raw(&self) -> &[u8] {
        &self.raw[..self.family.raw_len()]
    }

    /// The hostname this address was resolved from, if any.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn to_ip(&self) -> IpAddr {
        match self.family {
            AddressFamily::IPv4 => {
                IpAddr::V4(Ipv4Addr::new(self.raw[0], self.raw[1], self.raw[2], self.raw[3]))
            }
            AddressFamily::IPv6 => IpAddr::V6(Ipv6Addr::from(self.raw)),
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family && self.raw() == other.raw()
    }
}

impl Eq for Address {}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self {
                family: AddressFamily::IPv4,
                raw: {
                    let mut raw = [0u8; 16];
                    raw[..4].copy_from_slice(&v4.octets());
                    raw
                },
                hostname: None,
            },
            IpAddr::V6(v6) => Self {
                family: AddressFamily::IPv6,
                raw: v6.octets(),
                hostname: None,
            },
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ip())
    }
}

/// An (address, port) pair naming one side of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    address: Address,
    port: Port,
}

impl Endpoint {
    pub fn new(address: Address, port: Port) -> Self {
        Self { address, port }
    }

    /// Resolves `hostname` into an endpoint on `port`.
    pub fn resolve(hostname: &str, port: Port) -> Option<Self> {
        Address::resolve(hostname).map(|address| Self::new(address, port))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address.to_ip(), self.port)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(Address::from(addr.ip()), addr.port())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_socket_addr())
    }
}
