//! Busy and disabled signals derived from channel status.
//!
//! Nothing here is stored; every signal is recomputed from the loader.

use crate::loader::{ChannelKind, ChannelStatus, ReferenceDataLoader};

/// Filter controls backed by a reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterControl {
    Session,
    Location,
    CourseOption,
    Instructor,
    Grade,
}

impl FilterControl {
    pub const ALL: [Self; 5] = [
        Self::Session,
        Self::Location,
        Self::CourseOption,
        Self::Instructor,
        Self::Grade,
    ];

    pub fn channel(self) -> ChannelKind {
        match self {
            Self::Session => ChannelKind::Sessions,
            Self::Location => ChannelKind::Locations,
            Self::CourseOption => ChannelKind::CourseOptions,
            Self::Instructor => ChannelKind::Instructors,
            Self::Grade => ChannelKind::Grades,
        }
    }
}

/// True while any channel relevant to the current record is in flight.
pub fn is_busy(loader: &ReferenceDataLoader) -> bool {
    loader
        .relevant_channels()
        .any(|kind| loader.status(kind) == ChannelStatus::Loading)
}

/// A control is disabled while busy or while its option list is absent or empty.
pub fn is_disabled(loader: &ReferenceDataLoader, control: FilterControl) -> bool {
    is_busy(loader)
        || loader
            .options(control.channel())
            .is_none_or(<[_]>::is_empty)
}

/// Snapshot of every derived signal, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingSummary {
    pub busy: bool,
    pub channels: Vec<(ChannelKind, ChannelStatus)>,
    pub disabled: Vec<FilterControl>,
}

impl LoadingSummary {
    pub fn from_loader(loader: &ReferenceDataLoader) -> Self {
        Self {
            busy: is_busy(loader),
            channels: ChannelKind::ALL
                .into_iter()
                .map(|kind| (kind, loader.status(kind)))
                .collect(),
            disabled: FilterControl::ALL
                .into_iter()
                .filter(|control| is_disabled(loader, *control))
                .collect(),
        }
    }
}
