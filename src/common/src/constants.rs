pub const WORKING_DIR: &str = "/tmp/meshmap/";
pub const LOG_FILE: &str = "/tmp/meshmap/meshmap.log";

pub const DEFAULT_OUTPUT_FILE: &str = "coupling_graph.json";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_KUBECTL_BINARY: &str = "kubectl";
