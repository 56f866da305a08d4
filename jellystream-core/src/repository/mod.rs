pub mod channel;
pub mod collection;
pub mod schedule_entry;

pub use channel::ChannelRepository;
pub use collection::CollectionRepository;
pub use schedule_entry::ScheduleEntryRepository;
