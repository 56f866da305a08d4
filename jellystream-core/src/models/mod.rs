pub mod candidate;
pub mod channel;
pub mod collection;
pub mod enums;
pub mod id;
pub mod schedule_entry;

pub use candidate::{Candidate, CandidateSource};
pub use channel::{Channel, ChannelCollectionSource, ChannelGenreFilter, ChannelLibrary, ChannelSources};
pub use collection::{Collection, CollectionItem};
pub use enums::{
    FilterContentType, FilterType, ItemType, LibraryCollectionType, ScheduleType, ScheduledItemType,
};
pub use id::{ChannelId, CollectionId, CollectionItemId, ScheduleEntryId};
pub use schedule_entry::{NewScheduleEntry, ScheduleEntry};
