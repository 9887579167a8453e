//! The defaults registry is populated once per process, whoever asks first.

use std::thread;

use ckubeadm_core::{
    ensure_defaults_registered, registration_count, ConfigKind, MasterConfiguration,
};

#[test]
fn concurrent_callers_share_one_registration() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| std::ptr::from_ref(ensure_defaults_registered()) as usize))
        .collect();
    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(registration_count(), 1);
}

#[test]
fn registry_matches_document_defaults() {
    let registry = ensure_defaults_registered();
    let defaults = MasterConfiguration::default();
    assert_eq!(
        registry.get(ConfigKind::MasterConfiguration, "api.bindPort"),
        Some(defaults.api.bind_port.to_string().as_str())
    );
    assert_eq!(
        registry.get(ConfigKind::MasterConfiguration, "certificatesDir"),
        Some(defaults.certificates_dir.as_str())
    );
    assert!(registry.kinds().eq([
        ConfigKind::MasterConfiguration,
        ConfigKind::NodeConfiguration
    ]));
    assert_eq!(registration_count(), 1);
}
