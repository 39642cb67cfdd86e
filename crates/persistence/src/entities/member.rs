//! Member entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Member, MembershipLevel};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for membership_level that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "membership_level", rename_all = "lowercase")]
pub enum MembershipLevelDb {
    Basic,
    Silver,
    Gold,
    Platinum,
}

impl From<MembershipLevelDb> for MembershipLevel {
    fn from(db: MembershipLevelDb) -> Self {
        match db {
            MembershipLevelDb::Basic => MembershipLevel::Basic,
            MembershipLevelDb::Silver => MembershipLevel::Silver,
            MembershipLevelDb::Gold => MembershipLevel::Gold,
            MembershipLevelDb::Platinum => MembershipLevel::Platinum,
        }
    }
}

impl From<MembershipLevel> for MembershipLevelDb {
    fn from(level: MembershipLevel) -> Self {
        match level {
            MembershipLevel::Basic => MembershipLevelDb::Basic,
            MembershipLevel::Silver => MembershipLevelDb::Silver,
            MembershipLevel::Gold => MembershipLevelDb::Gold,
            MembershipLevel::Platinum => MembershipLevelDb::Platinum,
        }
    }
}

/// Database row mapping for the members table.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub membership_level: MembershipLevelDb,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub renewal_reminder_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberEntity> for Member {
    fn from(entity: MemberEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            membership_level: entity.membership_level.into(),
            subscription_end_date: entity.subscription_end_date,
            renewal_reminder_date: entity.renewal_reminder_date,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_level_conversion_roundtrip() {
        for level in [
            MembershipLevel::Basic,
            MembershipLevel::Silver,
            MembershipLevel::Gold,
            MembershipLevel::Platinum,
        ] {
            let db: MembershipLevelDb = level.into();
            assert_eq!(MembershipLevel::from(db), level);
        }
    }

    #[test]
    fn test_entity_into_member() {
        let entity = MemberEntity {
            id: Uuid::nil(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            membership_level: MembershipLevelDb::Gold,
            subscription_end_date: None,
            renewal_reminder_date: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let member: Member = entity.into();
        assert_eq!(member.membership_level, MembershipLevel::Gold);
        assert_eq!(member.name, "Ana");
    }
}
