//! Fixed deployment catalog
//!
//! The deploy groups, the services that can be placed under them and the
//! sub-service units of each service are compiled in. They are domain
//! knowledge, not user data: the CLI can move services between groups but
//! can never invent a new one.

/// Key the rendered document reserves for per-host variables
pub const META_KEY: &str = "_meta";

pub const COMPUTE: &str = "compute";
pub const CONTROL: &str = "control";
pub const NETWORK: &str = "network";
pub const STORAGE: &str = "storage";

/// Top-level deploy groups, in seeding order
pub const DEPLOY_GROUPS: &[&str] = &[COMPUTE, CONTROL, NETWORK, STORAGE];

/// A deployable service and its sub-service units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: &'static str,
    pub units: &'static [&'static str],
}

pub const SERVICES: &[ServiceSpec] = &[
    ServiceSpec {
        name: "cinder",
        units: &[
            "cinder-api",
            "cinder-backup",
            "cinder-scheduler",
            "cinder-volume",
        ],
    },
    ServiceSpec {
        name: "glance",
        units: &["glance-api", "glance-registry"],
    },
    ServiceSpec {
        name: "haproxy",
        units: &[],
    },
    ServiceSpec {
        name: "keystone",
        units: &[],
    },
    ServiceSpec {
        name: "mariadb",
        units: &[],
    },
    ServiceSpec {
        name: "ndb",
        units: &["ndb-data", "ndb-mgmt", "ndb-mysql"],
    },
    ServiceSpec {
        name: "neutron",
        units: &["neutron-server", "neutron-agents"],
    },
    ServiceSpec {
        name: "nova",
        units: &[
            "nova-api",
            "nova-conductor",
            "nova-consoleauth",
            "nova-novncproxy",
            "nova-scheduler",
        ],
    },
    ServiceSpec {
        name: "rabbitmq",
        units: &[],
    },
];

/// Services placed under each deploy group on first creation
pub const DEFAULT_HIERARCHY: &[(&str, &[&str])] = &[
    (COMPUTE, &[]),
    (CONTROL, &["glance", "keystone", "ndb", "nova", "rabbitmq"]),
    (NETWORK, &["haproxy", "neutron"]),
    (STORAGE, &["cinder"]),
];

/// Look up a service by name
pub fn service(name: &str) -> Option<&'static ServiceSpec> {
    SERVICES.iter().find(|s| s.name == name)
}

pub fn is_service(name: &str) -> bool {
    service(name).is_some()
}

pub fn is_deploy_group(name: &str) -> bool {
    DEPLOY_GROUPS.contains(&name)
}

pub fn is_unit(name: &str) -> bool {
    SERVICES.iter().any(|s| s.units.contains(&name))
}

/// Names a top-level group cannot take
///
/// Top-level groups share one namespace with services, units and `_meta`
/// in the rendered document.
pub fn is_reserved_group_name(name: &str) -> bool {
    name.is_empty() || name == META_KEY || is_service(name) || is_unit(name)
}

/// All service names in catalog order
pub fn service_names() -> impl Iterator<Item = &'static str> {
    SERVICES.iter().map(|s| s.name)
}
