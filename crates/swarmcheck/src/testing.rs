//! In-memory stand-ins for the orchestrator and the cluster client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::docker::{ClientOutput, ClusterClient, TlsClientConfig};
use crate::orchestrator::{RemoteUnit, Service};
use swarmcheck_common::{CommandOutput, Result, UnitId, VerifyError};

/// Scripted unit; records every command it is asked to run
pub struct FakeUnit {
    id: UnitId,
    address: String,
    responses: HashMap<String, CommandOutput>,
    files: HashMap<String, String>,
    relations: HashMap<(String, String), HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeUnit {
    pub fn new(service: &str, index: u32) -> Self {
        Self {
            id: UnitId::new(service, index),
            address: format!("10.0.0.{}", 10 + index),
            responses: HashMap::new(),
            files: HashMap::new(),
            relations: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn respond(mut self, command: &str, stdout: &str, exit_code: i32) -> Self {
        self.responses
            .insert(command.to_string(), CommandOutput::new(stdout, exit_code));
        self
    }

    pub fn file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    pub fn relation_data(mut self, endpoint: &str, remote: &str, settings: &[(&str, &str)]) -> Self {
        let settings = settings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.relations
            .insert((endpoint.to_string(), remote.to_string()), settings);
        self
    }

    /// Commands run so far, in order (file reads excluded)
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteUnit for FakeUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn public_address(&self) -> &str {
        &self.address
    }

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.to_string());
        Ok(self
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandOutput::new(format!("{}: command not found", command), 127)))
    }

    async fn file_contents(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| VerifyError::remote(self.id.to_string(), format!("no such file {}", path)))
    }

    async fn relation(&self, endpoint: &str, remote: &str) -> Result<HashMap<String, String>> {
        self.relations
            .get(&(endpoint.to_string(), remote.to_string()))
            .cloned()
            .ok_or_else(|| VerifyError::remote(self.id.to_string(), "no such relation"))
    }
}

/// Build a service from fake units, keeping handles for inspection
pub fn service_of(name: &str, units: Vec<FakeUnit>) -> (Service, Vec<Arc<FakeUnit>>) {
    let handles: Vec<Arc<FakeUnit>> = units.into_iter().map(Arc::new).collect();
    let members = handles
        .iter()
        .map(|h| Arc::clone(h) as Arc<dyn RemoteUnit>)
        .collect();
    (Service::new(name, members), handles)
}

/// What the fake client observed during one call
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub config: TlsClientConfig,
    /// Did the credential directory exist at call time?
    pub existed: bool,
    pub ca: Vec<u8>,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

/// Cluster client returning a canned result
pub struct FakeClient {
    output: ClientOutput,
    seen: Mutex<Vec<SeenCall>>,
}

impl FakeClient {
    pub fn new(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            output: ClientOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<SeenCall> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterClient for FakeClient {
    async fn cluster_info(&self, config: &TlsClientConfig) -> Result<ClientOutput> {
        let read = |name: &str| std::fs::read(config.cert_path.join(name)).unwrap_or_default();
        self.seen.lock().unwrap().push(SeenCall {
            config: config.clone(),
            existed: config.cert_path.is_dir(),
            ca: read("ca.pem"),
            cert: read("cert.pem"),
            key: read("key.pem"),
        });
        Ok(self.output.clone())
    }
}
