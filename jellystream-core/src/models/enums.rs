use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Manual,
    GenreAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LibraryCollectionType {
    Movies,
    Tvshows,
    Mixed,
}

/// Content-type partition used by genre filters; `Both` matches movies and
/// episodes alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FilterContentType {
    Movie,
    Episode,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Include,
    Exclude,
}

/// Classification used while expanding the candidate pool; only `Movie` and
/// `Episode` survive into schedule entries (spec invariant 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum ItemType {
    Movie,
    Series,
    Season,
    Episode,
    Collection,
}

impl ItemType {
    #[must_use]
    pub fn is_schedulable(self) -> bool {
        matches!(self, ItemType::Movie | ItemType::Episode)
    }
}

/// Narrowed item type for things that have actually made it onto a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum ScheduledItemType {
    Movie,
    Episode,
}

impl From<ScheduledItemType> for ItemType {
    fn from(value: ScheduledItemType) -> Self {
        match value {
            ScheduledItemType::Movie => ItemType::Movie,
            ScheduledItemType::Episode => ItemType::Episode,
        }
    }
}

impl TryFrom<ItemType> for ScheduledItemType {
    type Error = ();

    fn try_from(value: ItemType) -> Result<Self, Self::Error> {
        match value {
            ItemType::Movie => Ok(ScheduledItemType::Movie),
            ItemType::Episode => Ok(ScheduledItemType::Episode),
            _ => Err(()),
        }
    }
}
