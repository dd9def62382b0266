use serde::Deserialize;

/// The layer sizes of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default = "default_input_size")]
    pub input_size: usize,
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    #[serde(default = "default_output_size")]
    pub output_size: usize,
}

fn default_input_size() -> usize {
    784
}

fn default_hidden_size() -> usize {
    128
}

fn default_output_size() -> usize {
    10
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_size: default_input_size(),
            hidden_size: default_hidden_size(),
            output_size: default_output_size(),
        }
    }
}
