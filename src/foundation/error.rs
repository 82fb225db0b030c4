/// Convenience result type used across storyreel.
pub type StoryResult<T> = Result<T, StoryError>;

/// Error taxonomy for a render job.
///
/// Every stage error aborts the whole job. Segment-scoped variants carry the 1-based index of
/// the segment that failed, when one applies.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// The job workspace could not be established or written.
    #[error("workspace error{}: {message}", segment_suffix(.segment))]
    Workspace {
        /// Segment whose artifact was being written, if any.
        segment: Option<u32>,
        /// Human-readable cause.
        message: String,
    },

    /// The image or speech collaborator returned no usable result.
    #[error("generation error{}: {message}", segment_suffix(.segment))]
    Generation {
        /// Segment being generated, if any.
        segment: Option<u32>,
        /// Human-readable cause.
        message: String,
    },

    /// Audio duration could not be determined.
    #[error("probe error{}: {message}", segment_suffix(.segment))]
    Probe {
        /// Segment whose audio was probed, if any.
        segment: Option<u32>,
        /// Human-readable cause.
        message: String,
    },

    /// Still-video rendering failed.
    #[error("encode error{}: {message}", segment_suffix(.segment))]
    Encode {
        /// Segment whose clip was being encoded, if any.
        segment: Option<u32>,
        /// Human-readable cause.
        message: String,
    },

    /// Concatenation of the segment clips failed.
    #[error("assembly error: {0}")]
    Assembly(String),

    /// Segment list or text fields are out of bounds.
    #[error("malformed input{}: {message}", segment_suffix(.segment))]
    MalformedInput {
        /// Offending segment, if the problem is segment-local.
        segment: Option<u32>,
        /// Human-readable cause.
        message: String,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn segment_suffix(segment: &Option<u32>) -> String {
    match segment {
        Some(idx) => format!(" (segment {idx})"),
        None => String::new(),
    }
}

impl StoryError {
    /// Build a [`StoryError::Workspace`] value without a segment.
    pub fn workspace(msg: impl Into<String>) -> Self {
        Self::Workspace {
            segment: None,
            message: msg.into(),
        }
    }

    /// Build a [`StoryError::Generation`] value without a segment.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation {
            segment: None,
            message: msg.into(),
        }
    }

    /// Build a [`StoryError::Probe`] value without a segment.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            segment: None,
            message: msg.into(),
        }
    }

    /// Build a [`StoryError::Encode`] value without a segment.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            segment: None,
            message: msg.into(),
        }
    }

    /// Build a [`StoryError::Assembly`] value.
    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    /// Build a [`StoryError::MalformedInput`] value without a segment.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            segment: None,
            message: msg.into(),
        }
    }

    /// Attach a segment index to segment-scoped variants.
    ///
    /// An index that is already present is kept; other variants pass through unchanged.
    pub fn at_segment(self, index: u32) -> Self {
        match self {
            Self::Workspace { segment, message } => Self::Workspace {
                segment: segment.or(Some(index)),
                message,
            },
            Self::Generation { segment, message } => Self::Generation {
                segment: segment.or(Some(index)),
                message,
            },
            Self::Probe { segment, message } => Self::Probe {
                segment: segment.or(Some(index)),
                message,
            },
            Self::Encode { segment, message } => Self::Encode {
                segment: segment.or(Some(index)),
                message,
            },
            Self::MalformedInput { segment, message } => Self::MalformedInput {
                segment: segment.or(Some(index)),
                message,
            },
            other => other,
        }
    }

    /// Segment index carried by this error, if any.
    pub fn segment(&self) -> Option<u32> {
        match self {
            Self::Workspace { segment, .. }
            | Self::Generation { segment, .. }
            | Self::Probe { segment, .. }
            | Self::Encode { segment, .. }
            | Self::MalformedInput { segment, .. } => *segment,
            _ => None,
        }
    }

    /// Stable short name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Workspace { .. } => "workspace",
            Self::Generation { .. } => "generation",
            Self::Probe { .. } => "probe",
            Self::Encode { .. } => "encode",
            Self::Assembly(_) => "assembly",
            Self::MalformedInput { .. } => "malformed_input",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
