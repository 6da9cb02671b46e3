// Domain-level rejections for player actions.
//
// None of these reach the client; the gateway logs them and sends nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    RateLimited,
    UnknownPlayer,
    UnknownTarget,
    UnknownProjectile,
    UnknownItem,
    UnknownContainer,
    PlayerDead,
    PlayerAlive,
    TargetDead,
    OwnerMismatch,
    WeaponNotHeld,
    DuplicateHit,
    ReloadPending,
    NoAmmo,
    NoHealing,
    NothingToReload,
    HealingStackFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    RateLimited,
    InvalidReference,
    Duplicate,
    Exhausted,
}

impl Rejection {
    pub fn kind(self) -> RejectionKind {
        match self {
            Rejection::RateLimited => RejectionKind::RateLimited,
            Rejection::UnknownPlayer
            | Rejection::UnknownTarget
            | Rejection::UnknownProjectile
            | Rejection::UnknownItem
            | Rejection::UnknownContainer
            | Rejection::PlayerDead
            | Rejection::PlayerAlive
            | Rejection::TargetDead
            | Rejection::OwnerMismatch
            | Rejection::WeaponNotHeld => RejectionKind::InvalidReference,
            Rejection::DuplicateHit | Rejection::ReloadPending => RejectionKind::Duplicate,
            Rejection::NoAmmo
            | Rejection::NoHealing
            | Rejection::NothingToReload
            | Rejection::HealingStackFull => RejectionKind::Exhausted,
        }
    }
}
