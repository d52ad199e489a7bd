//! Tool definitions advertised to the chat-completion service.

use serde::Serialize;
use serde_json::json;

/// One tool in the OpenAI-compatible `tools` array.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

/// Function name, description, and JSON-schema parameters.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The tools every completion request advertises: web search for current
/// Python material, and a local code runner for demonstrations.
pub fn default_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: "web_search".to_string(),
                description: "Search the web for current Python documentation and reference material"
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search keywords"
                        },
                        "classes": {
                            "type": "array",
                            "description": "Restrict the search to specific content types",
                            "items": {
                                "type": "string",
                                "enum": ["all", "academic", "code", "library"]
                            }
                        }
                    },
                    "required": ["query"]
                }),
            },
        },
        ToolDefinition {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: "code_runner".to_string(),
                description: "Execute a Python snippet locally and return its output".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "The Python code to execute"
                        }
                    },
                    "required": ["code"]
                }),
            },
        },
    ]
}
