//! Compute tool — generates JavaScript and evaluates it remotely.
//!
//! Two-stage: first a non-streaming completion asks the model for code
//! solving the input, then the code ships through the correlation
//! bridge to the executor on the far side of the message channel. Any
//! failure along the way — empty code, remote error, timeout — degrades
//! to the fallback observation rather than failing the tool, so the
//! model can decide whether to try a different action.

use async_trait::async_trait;
use reagent_bridge::EvalBridge;
use reagent_core::error::ToolError;
use reagent_provider::CompletionBackend;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{Tool, FALLBACK_ANSWER};

pub struct ComputeTool {
    backend: Arc<dyn CompletionBackend>,
    bridge: Arc<EvalBridge>,
}

impl ComputeTool {
    pub fn new(backend: Arc<dyn CompletionBackend>, bridge: Arc<EvalBridge>) -> Self {
        Self { backend, bridge }
    }

    fn codegen_prompt(input: &str) -> String {
        format!(
            "You are a helpful assistant that writes JS code, do not output anything other \
             than the code itself. No explanation. Just the code so it can be executed \
             instantly. Write a JS function to return: {input}\n\
             And call the function at the end of the code."
        )
    }
}

#[async_trait]
impl Tool for ComputeTool {
    fn name(&self) -> &str {
        "Compute"
    }

    fn description(&self) -> &str {
        "Compute things by writing and evaluating JS code"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let code = match self.backend.complete(&Self::codegen_prompt(input)).await {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "Code generation failed");
                return Ok(FALLBACK_ANSWER.to_string());
            }
        };

        if code.trim().is_empty() {
            return Ok(FALLBACK_ANSWER.to_string());
        }

        debug!(code = %code, "Executing generated code remotely");

        match self.bridge.invoke(&code).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(error = %e, "Remote eval failed");
                Ok(FALLBACK_ANSWER.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reagent_bridge::EvalOutcome;
    use reagent_core::envelope::Envelope;
    use reagent_core::error::ProviderError;
    use reagent_provider::TokenStream;
    use tokio::sync::mpsc;

    struct FixedBackend {
        code: Option<String>,
    }

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn open_stream(
            &self,
            _prompt: &str,
            _stop: &[String],
        ) -> Result<TokenStream, ProviderError> {
            Err(ProviderError::NotConfigured("no streaming in tests".into()))
        }

        async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.code
                .clone()
                .ok_or_else(|| ProviderError::Network("connection refused".into()))
        }
    }

    fn tool_with(
        code: Option<&str>,
    ) -> (ComputeTool, Arc<EvalBridge>, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = Arc::new(
            EvalBridge::new(tx).with_timeout(std::time::Duration::from_millis(200)),
        );
        let backend = Arc::new(FixedBackend {
            code: code.map(str::to_string),
        });
        (ComputeTool::new(backend, bridge.clone()), bridge, rx)
    }

    #[tokio::test]
    async fn returns_remote_result_on_success() {
        let (tool, bridge, mut rx) = tool_with(Some("(() => 4)()"));

        let responder = tokio::spawn(async move {
            let Envelope::Eval { id, code } = rx.recv().await.unwrap() else {
                panic!("expected eval envelope");
            };
            assert!(code.contains("4"));
            bridge.resolve(&id, EvalOutcome::Success("4".into())).await;
        });

        assert_eq!(tool.execute("2 + 2").await.unwrap(), "4");
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn falls_back_when_codegen_fails() {
        let (tool, _bridge, _rx) = tool_with(None);
        assert_eq!(tool.execute("2 + 2").await.unwrap(), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn falls_back_on_empty_code() {
        let (tool, _bridge, _rx) = tool_with(Some("   \n"));
        assert_eq!(tool.execute("2 + 2").await.unwrap(), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn falls_back_on_remote_error() {
        let (tool, bridge, mut rx) = tool_with(Some("broken()"));

        let responder = tokio::spawn(async move {
            let Envelope::Eval { id, .. } = rx.recv().await.unwrap() else {
                panic!("expected eval envelope");
            };
            bridge
                .resolve(&id, EvalOutcome::Error("SyntaxError".into()))
                .await;
        });

        assert_eq!(tool.execute("2 + 2").await.unwrap(), FALLBACK_ANSWER);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn falls_back_on_eval_timeout() {
        // Nobody answers the eval request; the short bridge deadline fires.
        let (tool, _bridge, _rx) = tool_with(Some("(() => 1)()"));
        assert_eq!(tool.execute("1").await.unwrap(), FALLBACK_ANSWER);
    }
}
