use bmo_core::ConstantType;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{PromptMessage, PromptMessageRole},
    prompt,
    prompt_router,
    schemars,
};
use serde::{Deserialize, Serialize};

use crate::BmoMcp;

/// Arguments for the constant value generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerateValuesArgs {
    /// Type of the constant.
    #[serde(rename = "type")]
    pub kind: ConstantType,
}

/// Bilingual sample request for a constant type.
pub fn generate_values_text(kind: ConstantType) -> String {
    format!(
        "Generate suitable values for type \"{kind}\" in Turkish and English.\nExample:\n- tr: Örnek Değer\n- en: Sample Value"
    )
}

#[prompt_router(vis = "pub")]
impl BmoMcp {
    #[prompt(
        name = "generate-constant-values",
        description = "Generate appropriate values for the given constant type in both English and Turkish languages."
    )]
    async fn generate_constant_values(
        &self,
        Parameters(args): Parameters<GenerateValuesArgs>,
    ) -> Vec<PromptMessage> {
        vec![PromptMessage::new_text(
            PromptMessageRole::User,
            generate_values_text(args.kind),
        )]
    }
}
