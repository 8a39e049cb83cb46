use std::net::{IpAddr, SocketAddr};

use tracing::debug;

use crate::config::AccessSettings;

/// Access checks for directory listings
pub trait AclChecker: Send + Sync + 'static {
    fn is_allowed(&self, peer: SocketAddr) -> bool;
}

/// Addresses allowed to list directories
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IpAllowList {
    addresses: Vec<IpAddr>,
}

impl IpAllowList {
    pub fn new(addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            addresses: addresses.into_iter().map(canonical).collect(),
        }
    }

    pub fn from_config(settings: &AccessSettings) -> Self {
        Self::new(settings.iplist.clone().unwrap_or_default())
    }

    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }
}

impl AclChecker for IpAllowList {
    #[tracing::instrument(level = "debug", skip(self))]
    fn is_allowed(&self, peer: SocketAddr) -> bool {
        let ip = canonical(peer.ip());
        let allowed = self.addresses.contains(&ip);
        debug!("[acl] peer: {ip}, allowed: {allowed}");
        allowed
    }
}

// IPv4 peers reaching a dual-stack socket show up as IPv4-mapped IPv6
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map_or(IpAddr::V6(v6), IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn peer(ip: IpAddr) -> SocketAddr {
        SocketAddr::new(ip, 54321)
    }

    #[test]
    fn test_allowed_addresses_passes() {
        let acl = IpAllowList::new([
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            "10.0.0.7".parse().unwrap(),
        ]);

        assert!(acl.is_allowed(peer(IpAddr::V4(Ipv4Addr::LOCALHOST))));
        assert!(acl.is_allowed(peer("10.0.0.7".parse().unwrap())));
        assert!(!acl.is_allowed(peer("10.0.0.70".parse().unwrap())));
        assert!(!acl.is_allowed(peer("127.0.0.2".parse().unwrap())));
        assert!(!acl.is_allowed(peer(IpAddr::V6(Ipv6Addr::LOCALHOST))));
    }

    #[test]
    fn test_ipv4_mapped_peer_passes() {
        let acl = IpAllowList::new([IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        let mapped = IpAddr::V6(Ipv4Addr::LOCALHOST.to_ipv6_mapped());

        assert!(acl.is_allowed(peer(mapped)));
    }

    #[test]
    fn test_empty_list_denies_all_passes() {
        let acl = IpAllowList::default();
        assert!(!acl.is_allowed(peer(IpAddr::V4(Ipv4Addr::LOCALHOST))));
    }

    #[test]
    fn test_from_config_passes() {
        let settings = AccessSettings {
            iplist: Some(vec!["192.168.1.1".parse().unwrap()]),
        };
        let acl = IpAllowList::from_config(&settings);
        assert_eq!(acl.addresses(), &["192.168.1.1".parse::<IpAddr>().unwrap()]);
    }
}
