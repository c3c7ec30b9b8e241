//! Shared constants for swarmcheck components.

/// Default Juju CLI binary
pub const DEFAULT_JUJU_BIN: &str = "juju";

/// Juju subcommand used to execute commands in a unit's hook context
pub const DEFAULT_EXEC_SUBCOMMAND: &str = "run";

/// Default Docker client binary
pub const DEFAULT_DOCKER_BIN: &str = "docker";

/// Service running the Swarm manager and agent containers
pub const DEFAULT_CLUSTER_SERVICE: &str = "swarm";

/// Service running the Consul coordination backend
pub const DEFAULT_BACKEND_SERVICE: &str = "consul";

/// Container name of the Swarm manager (present on the leader only)
pub const MANAGER_CONTAINER: &str = "swarm_manager_1";

/// Container name of the Swarm agent (present on every unit)
pub const AGENT_CONTAINER: &str = "swarm_agent_1";

/// Marker `docker ps` prints for containers stuck in a restart loop
pub const RESTART_MARKER: &str = "restarting";

/// Number of nodes a freshly deployed bundle should report
pub const DEFAULT_EXPECTED_NODES: u32 = 2;

/// Discovery backend URL scheme (`consul://host:port`)
pub const DISCOVERY_SCHEME: &str = "consul";

/// Consul HTTP API port
pub const DISCOVERY_PORT: u16 = 8500;

/// Relation endpoint on the backend units that carries their address
pub const DISCOVERY_RELATION: &str = "api";

/// Remote side of the discovery relation (`service:endpoint`)
pub const DISCOVERY_RELATION_REMOTE: &str = "swarm:consul";

/// Relation data key holding a unit's private address
pub const PRIVATE_ADDRESS_KEY: &str = "private-address";

/// TLS-secured Swarm manager port
pub const SWARM_TLS_PORT: u16 = 3376;

/// Per remote command timeout (seconds)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 120;

/// Timeout for the authenticated client call (seconds)
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 60;

/// Remote paths used for credential extraction
pub mod credentials {
    /// Directory the archive is unpacked into
    pub const UNPACK_DIR: &str = "/home/ubuntu";

    /// Archive generated by the leader
    pub const ARCHIVE_PATH: &str = "/home/ubuntu/swarm_credentials.tar";

    /// Directory the archive unpacks to
    pub const EXTRACTED_DIR: &str = "/home/ubuntu/swarm_credentials";

    /// CA certificate file name
    pub const CA_FILE: &str = "ca.pem";

    /// Client certificate file name
    pub const CERT_FILE: &str = "cert.pem";

    /// Client private key file name
    pub const KEY_FILE: &str = "key.pem";

    /// Suffix of the local temporary workspace directory
    pub const WORKSPACE_SUFFIX: &str = "docker-credentials";
}

/// Fixed remote command strings
pub mod commands {
    /// Leadership probe; prints `True` or `False`
    pub const IS_LEADER: &str = "is-leader";

    /// Container status listing
    pub const STATUS_LISTING: &str = "docker ps";

    /// Daemon diagnostic dump
    pub const DIAGNOSTIC: &str = "docker info";

    /// Structured query for the configured cluster store
    pub const CLUSTER_STORE_QUERY: &str = "docker info --format '{{.ClusterStore}}'";

    /// Unit public address lookup
    pub const PUBLIC_ADDRESS: &str = "unit-get public-address";
}

/// Environment variables consumed by the Docker client
pub mod docker_env {
    pub const CERT_PATH: &str = "DOCKER_CERT_PATH";
    pub const TLS_VERIFY: &str = "DOCKER_TLS_VERIFY";
    pub const HOST: &str = "DOCKER_HOST";
    pub const CONTEXT: &str = "DOCKER_CONTEXT";
}
