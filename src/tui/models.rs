#[derive(Debug, Clone)]
pub struct FileItem {
    pub original_name: String,
    pub new_name: String,
    pub episode_number: u32,
    pub inferred: bool,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigInputMode {
    Source,
    Target,
    MediaName,
    Season,
    TransferType,
    Confirm,
}

impl ConfigInputMode {
    pub fn next(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::MediaName,
            Self::MediaName => Self::Season,
            Self::Season => Self::TransferType,
            Self::TransferType | Self::Confirm => Self::Confirm,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Source | Self::Target => Self::Source,
            Self::MediaName => Self::Target,
            Self::Season => Self::MediaName,
            Self::TransferType => Self::Season,
            Self::Confirm => Self::TransferType,
        }
    }

    pub fn accepts_text(self) -> bool {
        matches!(
            self,
            Self::Source | Self::Target | Self::MediaName | Self::Season
        )
    }
}

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
