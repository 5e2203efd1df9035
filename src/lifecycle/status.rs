use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Election phase as owned by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElectionStatus {
    Closed,
    Open,
    Completed,
}

/// Wire spelling of [`ElectionStatus`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusDialect {
    /// `closed` / `open` / `completed`
    #[default]
    English,
    /// `tutup` / `berlangsung` / `selesai`
    Indonesian,
}

impl ElectionStatus {
    pub fn as_wire(
        self,
        dialect: StatusDialect,
    ) -> &'static str {
        match (dialect, self) {
            (StatusDialect::English, ElectionStatus::Closed) => "closed",
            (StatusDialect::English, ElectionStatus::Open) => "open",
            (StatusDialect::English, ElectionStatus::Completed) => "completed",
            (StatusDialect::Indonesian, ElectionStatus::Closed) => "tutup",
            (StatusDialect::Indonesian, ElectionStatus::Open) => "berlangsung",
            (StatusDialect::Indonesian, ElectionStatus::Completed) => "selesai",
        }
    }

    /// Accepts either dialect, case-insensitively
    pub fn parse_wire(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "closed" | "tutup" => Some(ElectionStatus::Closed),
            "open" | "berlangsung" => Some(ElectionStatus::Open),
            "completed" | "selesai" => Some(ElectionStatus::Completed),
            _ => None,
        }
    }

    /// Dashboard label
    pub fn label(self) -> &'static str {
        match self {
            ElectionStatus::Open => "Sedang Berlangsung",
            ElectionStatus::Completed => "Telah Selesai",
            ElectionStatus::Closed => "Ditutup",
        }
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_wire(StatusDialect::English))
    }
}

impl FromStr for ElectionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_wire(s).ok_or_else(|| format!("unknown election status `{s}`"))
    }
}

/// Client-side mirror of the server status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachedStatus {
    /// Before the first successful fetch, or after a failed one
    #[default]
    Unknown,
    Known(ElectionStatus),
}

impl CachedStatus {
    pub fn status(self) -> Option<ElectionStatus> {
        match self {
            CachedStatus::Known(status) => Some(status),
            CachedStatus::Unknown => None,
        }
    }

    /// Ballot and identity screens are reachable only here
    pub fn is_open(self) -> bool {
        self == CachedStatus::Known(ElectionStatus::Open)
    }

    /// Status used to pick a voter-facing view; an unknown status fails closed
    pub fn effective(self) -> ElectionStatus {
        self.status().unwrap_or(ElectionStatus::Closed)
    }

    pub fn label(self) -> &'static str {
        match self {
            CachedStatus::Known(status) => status.label(),
            CachedStatus::Unknown => "Status Tidak Diketahui",
        }
    }
}

impl fmt::Display for CachedStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            CachedStatus::Known(status) => status.fmt(f),
            CachedStatus::Unknown => f.write_str("unknown"),
        }
    }
}

/// Admin commands driving the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleCommand {
    /// `closed -> open`
    Start,
    /// `open -> completed`
    End,
    /// `completed -> closed`, purging every ballot
    Reset,
}

impl LifecycleCommand {
    pub fn name(self) -> &'static str {
        match self {
            LifecycleCommand::Start => "start",
            LifecycleCommand::End => "end",
            LifecycleCommand::Reset => "reset",
        }
    }

    /// Status the command may be issued from
    pub fn required_status(self) -> ElectionStatus {
        match self {
            LifecycleCommand::Start => ElectionStatus::Closed,
            LifecycleCommand::End => ElectionStatus::Open,
            LifecycleCommand::Reset => ElectionStatus::Completed,
        }
    }

    pub fn target_status(self) -> ElectionStatus {
        match self {
            LifecycleCommand::Start => ElectionStatus::Open,
            LifecycleCommand::End => ElectionStatus::Completed,
            LifecycleCommand::Reset => ElectionStatus::Closed,
        }
    }

    /// The single command offered for a status
    pub fn for_status(status: ElectionStatus) -> Self {
        match status {
            ElectionStatus::Closed => LifecycleCommand::Start,
            ElectionStatus::Open => LifecycleCommand::End,
            ElectionStatus::Completed => LifecycleCommand::Reset,
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, LifecycleCommand::Reset)
    }

    /// Button label of the admin control
    pub fn label(self) -> &'static str {
        match self {
            LifecycleCommand::Start => "Mulai Pemira",
            LifecycleCommand::End => "Akhiri Pemira",
            LifecycleCommand::Reset => "Reset Pemira",
        }
    }
}
