//! Default records created on first start of a local store.

/// Device roles the provisioning scripts look up by name: (name, slug, color)
pub fn seed_device_role_params() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("Core Switch", "core-switch", "f44336"),
        ("Access Switch", "access-switch", "2196f3"),
        ("Cabin Switch", "cabin-switch", "4caf50"),
    ]
}

/// Common switch models: (manufacturer, model, slug)
pub fn seed_device_type_params() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("Arista", "DCS-7050SX3-48YC8", "arista-dcs-7050sx3-48yc8"),
        ("Arista", "DCS-7010TX-48", "arista-dcs-7010tx-48"),
        ("Cisco", "C9300-48P", "cisco-c9300-48p"),
        ("Cisco", "C9200L-24P-4G", "cisco-c9200l-24p-4g"),
        ("Juniper", "EX4300-48T", "juniper-ex4300-48t"),
    ]
}
