//! Context providers
//!
//! A context provider supplies system guidance right before an agent turn
//! and may observe the turn right after it. The set of variants is fixed:
//! - `Static`: file-backed instructions
//! - `Orchestrator`: routing template with every domain's description
//! - `Location`: instructions plus a persistent user-location slot

mod instructions;
mod location;

pub use instructions::{FileInstructions, InstructionsSource};
pub use location::{LocationSlot, UserLocation};

#[cfg(test)]
pub use instructions::MockInstructionsSource;

use crate::config::AGENT_DESCRIPTIONS_PLACEHOLDER;
use crate::error::{Error, Result};
use crate::session::AgentSession;
use chatbro_llm::{complete_structured, LlmProvider, Message, MessageRole, StructuredOutput};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Guidance injected while the location slot is unset
pub const ASK_FOR_LOCATION: &str = "Ask the user for their location coordinates (latitude and longitude). Decline to answer any questions until they provide it.";

const EXTRACT_LOCATION: &str = "Extract the user's location latitude and longitude from the message if present. If not present return null.";

/// A domain's entry in the orchestrator routing prompt
#[derive(Debug, Clone)]
pub struct RoutingEntry {
    /// Tool name the orchestrator calls
    pub tool_name: String,
    /// Path of the domain's short description
    pub description_path: PathBuf,
}

/// Chat backend used for location extraction
#[derive(Clone)]
pub struct LocationExtractor {
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl LocationExtractor {
    /// Create an extractor using `model`
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    async fn extract(&self, messages: Vec<Message>) -> Result<Option<UserLocation>> {
        let output = StructuredOutput::new(
            EXTRACT_LOCATION,
            serde_json::json!({
                "type": ["object", "null"],
                "properties": {
                    "latitude": { "type": "number" },
                    "longitude": { "type": "number" }
                },
                "required": ["latitude", "longitude"]
            }),
        );

        let found: Option<UserLocation> =
            complete_structured(self.llm.as_ref(), &self.model, messages, &output).await?;
        Ok(found)
    }
}

/// Per-agent context provider
#[derive(Clone)]
pub enum ContextProvider {
    /// Instructions read verbatim from a file
    Static {
        /// Instructions source
        source: Arc<dyn InstructionsSource>,
        /// Instructions file
        path: PathBuf,
    },
    /// Routing template aggregating every domain description
    Orchestrator {
        /// Instructions source
        source: Arc<dyn InstructionsSource>,
        /// Template file containing the placeholder
        template: PathBuf,
        /// Domains in catalog order
        domains: Vec<RoutingEntry>,
    },
    /// Instructions plus the user-location slot
    Location {
        /// Instructions source
        source: Arc<dyn InstructionsSource>,
        /// Instructions file
        path: PathBuf,
        /// Backend for slot extraction
        extractor: LocationExtractor,
    },
}

impl ContextProvider {
    /// File-backed instructions
    pub fn static_instructions(source: Arc<dyn InstructionsSource>, path: impl Into<PathBuf>) -> Self {
        Self::Static {
            source,
            path: path.into(),
        }
    }

    /// Orchestrator routing prompt
    pub fn orchestrator(
        source: Arc<dyn InstructionsSource>,
        template: impl Into<PathBuf>,
        domains: Vec<RoutingEntry>,
    ) -> Self {
        Self::Orchestrator {
            source,
            template: template.into(),
            domains,
        }
    }

    /// Instructions with location slot-filling
    pub fn location(
        source: Arc<dyn InstructionsSource>,
        path: impl Into<PathBuf>,
        extractor: LocationExtractor,
    ) -> Self {
        Self::Location {
            source,
            path: path.into(),
            extractor,
        }
    }

    /// Variant name, for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static { .. } => "static",
            Self::Orchestrator { .. } => "orchestrator",
            Self::Location { .. } => "location",
        }
    }

    /// Check that the instructions this provider needs are readable.
    ///
    /// # Errors
    /// Returns `Error::Instructions` for a missing or empty file
    pub async fn preflight(&self) -> Result<()> {
        match self {
            Self::Static { source, path } | Self::Location { source, path, .. } => {
                load_instructions(source.as_ref(), path).await?;
            }
            Self::Orchestrator {
                source, template, ..
            } => {
                let text = load_instructions(source.as_ref(), template).await?;
                if !text.contains(AGENT_DESCRIPTIONS_PLACEHOLDER) {
                    warn!(
                        path = %template.display(),
                        placeholder = AGENT_DESCRIPTIONS_PLACEHOLDER,
                        "Orchestrator template has no placeholder, domain descriptions will be omitted"
                    );
                }
            }
        }
        Ok(())
    }

    /// System messages to prepend before a turn over `session`
    ///
    /// # Errors
    /// Returns `Error::Instructions` if the instructions cannot be loaded
    pub async fn invoking(&self, session: &AgentSession) -> Result<Vec<Message>> {
        match self {
            Self::Static { source, path } => {
                let text = load_instructions(source.as_ref(), path).await?;
                Ok(vec![Message::system(text)])
            }
            Self::Orchestrator {
                source,
                template,
                domains,
            } => {
                let text = load_instructions(source.as_ref(), template).await?;
                let blocks = routing_blocks(source.as_ref(), domains).await;
                Ok(vec![Message::system(
                    text.replace(AGENT_DESCRIPTIONS_PLACEHOLDER, &blocks),
                )])
            }
            Self::Location { source, path, .. } => {
                let text = load_instructions(source.as_ref(), path).await?;
                let slot = match LocationSlot::load(session) {
                    LocationSlot::Unset => {
                        debug!(session_id = %session.id, "Location unset, asking for coordinates");
                        Message::system(ASK_FOR_LOCATION)
                    }
                    LocationSlot::Set(location) => Message::system(location.as_fact()),
                };
                Ok(vec![Message::system(text), slot])
            }
        }
    }

    /// Observe a finished turn.
    ///
    /// `turn` holds the messages appended during the turn. Only the location
    /// variant reacts: while its slot is unset it tries to extract
    /// coordinates from the turn's user messages. Extraction failures are
    /// logged and leave the slot unset.
    pub async fn invoked(
        &self,
        session: &mut AgentSession,
        turn: &[Message],
        cancel: &CancellationToken,
    ) {
        let Self::Location { extractor, .. } = self else {
            return;
        };
        if LocationSlot::load(session) != LocationSlot::Unset {
            return;
        }

        let user_messages: Vec<Message> = turn
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .cloned()
            .collect();
        if user_messages.is_empty() {
            return;
        }

        info!(session_id = %session.id, "Trying to extract user location");
        let extracted = tokio::select! {
            () = cancel.cancelled() => {
                debug!(session_id = %session.id, "Location extraction cancelled");
                return;
            }
            res = extractor.extract(user_messages) => res,
        };

        match extracted {
            Ok(Some(candidate)) => match candidate.validated() {
                Some(location) => match LocationSlot::Set(location).store(session) {
                    Ok(()) => info!(
                        session_id = %session.id,
                        latitude = location.latitude,
                        longitude = location.longitude,
                        "Extracted user location"
                    ),
                    Err(e) => warn!(session_id = %session.id, error = %e, "Failed to store user location"),
                },
                None => info!(
                    session_id = %session.id,
                    latitude = candidate.latitude,
                    longitude = candidate.longitude,
                    "Rejected implausible user location"
                ),
            },
            Ok(None) => info!(session_id = %session.id, "No user location found in the message"),
            Err(e) => warn!(session_id = %session.id, error = %e, "Location extraction failed"),
        }
    }
}

/// Read instructions, treating an empty file as missing
async fn load_instructions(source: &dyn InstructionsSource, path: &Path) -> Result<String> {
    let text = source.read_text(path).await?;
    if text.trim().is_empty() {
        return Err(Error::Instructions {
            path: path.to_path_buf(),
            message: "file is empty".to_string(),
        });
    }
    Ok(text)
}

/// `"## {tool}\n{description}"` blocks in catalog order; unreadable
/// descriptions are skipped
async fn routing_blocks(source: &dyn InstructionsSource, domains: &[RoutingEntry]) -> String {
    let mut blocks = Vec::with_capacity(domains.len());
    for entry in domains {
        match source.read_text(&entry.description_path).await {
            Ok(description) if !description.trim().is_empty() => {
                blocks.push(format!("## {}\n{}", entry.tool_name, description.trim()));
            }
            Ok(_) => warn!(
                tool = %entry.tool_name,
                path = %entry.description_path.display(),
                "Domain description is empty, skipping"
            ),
            Err(e) => warn!(
                tool = %entry.tool_name,
                error = %e,
                "Failed to load domain description, skipping"
            ),
        }
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests;
