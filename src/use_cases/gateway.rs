// Event handlers: resolve the player, validate, delegate to the domain, and address the results.

use super::reload::ReloadScheduler;
use super::types::{ClientCommand, GameEvent, Outbound, ServerEvent};
use crate::domain::{
    Clock, CombatValidator, ConnectionId, ContainerId, DamageReport, FireOutcome, ItemId,
    MovementUpdate, Player, PlayerId, ProjectileId, Rejection, WeaponKind, WorldState,
};
use tracing::{debug, info};

type Handled = Result<Vec<Outbound>, Rejection>;

pub struct Gateway<C: Clock> {
    world: WorldState,
    combat: CombatValidator,
    reloads: ReloadScheduler,
    clock: C,
}

impl<C: Clock> Gateway<C> {
    pub fn new(world: WorldState, clock: C) -> Self {
        Self {
            world,
            combat: CombatValidator::new(),
            reloads: ReloadScheduler::new(),
            clock,
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn reloads(&self) -> &ReloadScheduler {
        &self.reloads
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn player_count(&self) -> usize {
        self.world.player_count()
    }

    pub fn next_reload_deadline(&self) -> Option<u64> {
        self.reloads.next_deadline()
    }

    pub fn handle_event(&mut self, event: GameEvent) -> Vec<Outbound> {
        match event {
            GameEvent::Connect { connection_id } => self.connect(connection_id),
            GameEvent::Disconnect { connection_id } => self.disconnect(connection_id),
            GameEvent::Command {
                connection_id,
                command,
            } => self.handle(connection_id, command),
        }
    }

    pub fn connect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        let player = self.world.add_player(connection_id).clone();
        info!(
            player_id = player.id,
            connection_id,
            x = player.position.x,
            y = player.position.y,
            "player joined"
        );

        let mut out = Vec::with_capacity(2);
        if let Some(full) = self.world.full_state(connection_id) {
            out.push(Outbound::only(connection_id, ServerEvent::Init(Box::new(full))));
        }
        out.push(Outbound::all_except(
            connection_id,
            ServerEvent::PlayerJoined(Box::new(player)),
        ));
        out
    }

    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        let Some(player) = self.world.remove_player(connection_id) else {
            return Vec::new();
        };
        let cancelled = self.reloads.cancel_player(player.id);
        info!(player_id = player.id, connection_id, cancelled, "player left");

        vec![Outbound::all(ServerEvent::PlayerLeft {
            player_id: player.id,
        })]
    }

    /// Runs one client command; rejected commands are logged and produce nothing.
    pub fn handle(&mut self, connection_id: ConnectionId, command: ClientCommand) -> Vec<Outbound> {
        let result = match command {
            ClientCommand::Move(update) => self.on_move(connection_id, update),
            ClientCommand::WeaponSwitch { weapon } => self.on_weapon_switch(connection_id, weapon),
            ClientCommand::Shoot { weapon, angle } => self.on_shoot(connection_id, weapon, angle),
            ClientCommand::Hit {
                projectile_id,
                target_id,
                damage,
            } => self.on_hit(connection_id, projectile_id, target_id, damage),
            ClientCommand::Heal { amount } => self.on_heal(connection_id, amount),
            ClientCommand::Respawn => self.on_respawn(connection_id),
            ClientCommand::PickupItem { item_id } => self.on_pickup(connection_id, item_id),
            ClientCommand::BoxDamage {
                container_id,
                damage,
            } => self.on_box_damage(connection_id, container_id, damage),
            ClientCommand::Reload { weapon } => self.on_reload(connection_id, weapon),
            ClientCommand::BulletDestroyed { projectile_id } => {
                self.on_bullet_destroyed(connection_id, projectile_id)
            }
        };

        match result {
            Ok(out) => out,
            Err(rejection) => {
                debug!(
                    connection_id,
                    ?rejection,
                    kind = ?rejection.kind(),
                    "command rejected"
                );
                Vec::new()
            }
        }
    }

    fn alive_player(&mut self, connection_id: ConnectionId) -> Result<&mut Player, Rejection> {
        let player = self
            .world
            .player_by_connection_mut(connection_id)
            .ok_or(Rejection::UnknownPlayer)?;
        if !player.is_alive() {
            return Err(Rejection::PlayerDead);
        }
        Ok(player)
    }

    fn on_move(&mut self, connection_id: ConnectionId, update: MovementUpdate) -> Handled {
        self.alive_player(connection_id)?;
        let player = self
            .world
            .move_player(connection_id, update)
            .ok_or(Rejection::UnknownPlayer)?;

        Ok(vec![Outbound::all_except(
            connection_id,
            ServerEvent::PlayerMoved {
                player_id: player.id,
                position: player.position,
                rotation: player.rotation,
                direction: player.direction,
                is_moving: player.is_moving,
            },
        )])
    }

    fn on_weapon_switch(&mut self, connection_id: ConnectionId, weapon: WeaponKind) -> Handled {
        let player = self.alive_player(connection_id)?;
        if !player.inventory.holds(weapon) {
            return Err(Rejection::WeaponNotHeld);
        }
        player.current_weapon = weapon;

        Ok(vec![Outbound::all_except(
            connection_id,
            ServerEvent::WeaponChanged {
                player_id: player.id,
                weapon,
            },
        )])
    }

    fn on_shoot(&mut self, connection_id: ConnectionId, weapon: WeaponKind, angle: f32) -> Handled {
        let now = self.now();
        let spec = weapon.spec();
        let player = self.alive_player(connection_id)?;
        let shooter_id = player.id;

        if spec.uses_ammo() {
            let slot = player
                .inventory
                .slot(weapon)
                .ok_or(Rejection::WeaponNotHeld)?;
            if slot.magazine == 0 {
                return Err(Rejection::NoAmmo);
            }
        }

        let outcome = self
            .combat
            .handle_fire(&mut self.world, shooter_id, weapon, angle, now)?;

        let mut out = Vec::new();
        if spec.uses_ammo() {
            if let Some(slot) = self
                .world
                .player_by_connection_mut(connection_id)
                .and_then(|p| p.inventory.slot_mut(weapon))
            {
                slot.magazine = slot.magazine.saturating_sub(1);
                out.push(Outbound::only(
                    connection_id,
                    ServerEvent::AmmoUpdate {
                        weapon,
                        magazine: slot.magazine,
                        reserve: slot.reserve,
                    },
                ));
            }
        }

        match outcome {
            FireOutcome::Projectiles(projectiles) => {
                out.push(Outbound::all(ServerEvent::Bullets {
                    player_id: shooter_id,
                    projectiles,
                }));
            }
            FireOutcome::Melee(hits) => {
                for hit in hits {
                    out.push(Outbound::all(ServerEvent::Damage(DamageReport {
                        target_id: hit.target_id,
                        attacker_id: shooter_id,
                        damage: hit.damage,
                        hp: hit.hp,
                        killed: hit.killed,
                    })));
                    if hit.killed {
                        out.push(Outbound::all(ServerEvent::PlayerDied {
                            player_id: hit.target_id,
                            killer_id: shooter_id,
                        }));
                    }
                }
            }
        }
        Ok(out)
    }

    fn on_hit(
        &mut self,
        connection_id: ConnectionId,
        projectile_id: ProjectileId,
        target_id: PlayerId,
        damage: i32,
    ) -> Handled {
        let shooter_id = self
            .world
            .player_by_connection(connection_id)
            .ok_or(Rejection::UnknownPlayer)?
            .id;

        let report = self.combat.validate_hit(
            &mut self.world,
            shooter_id,
            projectile_id,
            target_id,
            damage,
        )?;

        let mut out = vec![Outbound::all(ServerEvent::Damage(report))];
        if report.killed {
            info!(player_id = target_id, killer_id = shooter_id, "player killed");
            out.push(Outbound::all(ServerEvent::PlayerDied {
                player_id: target_id,
                killer_id: shooter_id,
            }));
        }
        Ok(out)
    }

    fn on_heal(&mut self, connection_id: ConnectionId, amount: Option<i32>) -> Handled {
        let cap = self.world.tuning().player.heal_amount;
        let player = self.alive_player(connection_id)?;
        if player.inventory.healing == 0 {
            return Err(Rejection::NoHealing);
        }

        player.inventory.healing -= 1;
        player.heal(amount.unwrap_or(cap).clamp(0, cap));

        Ok(vec![Outbound::all(ServerEvent::PlayerHealed {
            player_id: player.id,
            hp: player.hp,
            max_hp: player.max_hp,
        })])
    }

    fn on_respawn(&mut self, connection_id: ConnectionId) -> Handled {
        let player = self
            .world
            .player_by_connection(connection_id)
            .ok_or(Rejection::UnknownPlayer)?;
        if player.is_alive() {
            return Err(Rejection::PlayerAlive);
        }

        let position = self.world.respawn_position();
        let player = self
            .world
            .player_by_connection_mut(connection_id)
            .ok_or(Rejection::UnknownPlayer)?;
        player.respawn(position);
        info!(player_id = player.id, "player respawned");

        Ok(vec![Outbound::all(ServerEvent::PlayerRespawned {
            player_id: player.id,
            position: player.position,
            hp: player.hp,
        })])
    }

    fn on_pickup(&mut self, connection_id: ConnectionId, item_id: ItemId) -> Handled {
        self.alive_player(connection_id)?;
        let item = self.world.pickup_item(connection_id, item_id)?;
        let player = self
            .world
            .player_by_connection(connection_id)
            .ok_or(Rejection::UnknownPlayer)?;

        Ok(vec![
            Outbound::all(ServerEvent::ItemPicked {
                item_id: item.id,
                player_id: player.id,
            }),
            Outbound::only(
                connection_id,
                ServerEvent::InventoryUpdate {
                    inventory: player.inventory.clone(),
                    current_weapon: player.current_weapon,
                },
            ),
        ])
    }

    fn on_box_damage(
        &mut self,
        connection_id: ConnectionId,
        container_id: ContainerId,
        damage: i32,
    ) -> Handled {
        self.alive_player(connection_id)?;
        let now = self.now();
        let result = self
            .world
            .damage_container(container_id, damage.max(0), now)
            .ok_or(Rejection::UnknownContainer)?;

        let mut out = vec![Outbound::all(ServerEvent::BoxDamaged {
            container_id,
            hp: result.container.hp,
            destroyed: result.container.destroyed,
        })];
        if let Some(item) = result.dropped {
            out.push(Outbound::all(ServerEvent::ItemDropped(item)));
        }
        Ok(out)
    }

    fn on_reload(&mut self, connection_id: ConnectionId, weapon: WeaponKind) -> Handled {
        let now = self.now();
        let spec = weapon.spec();
        if !spec.uses_ammo() {
            return Err(Rejection::NothingToReload);
        }

        let player = self.alive_player(connection_id)?;
        let player_id = player.id;
        let slot = player
            .inventory
            .slot(weapon)
            .ok_or(Rejection::WeaponNotHeld)?;
        if slot.magazine >= spec.magazine_size {
            return Err(Rejection::NothingToReload);
        }
        if !spec.infinite_ammo && slot.reserve == 0 {
            return Err(Rejection::NoAmmo);
        }

        if !self
            .reloads
            .schedule(player_id, weapon, now + spec.reload_time_ms)
        {
            return Err(Rejection::ReloadPending);
        }
        debug!(player_id, ?weapon, due_in_ms = spec.reload_time_ms, "reload started");
        Ok(Vec::new())
    }

    fn on_bullet_destroyed(
        &mut self,
        connection_id: ConnectionId,
        projectile_id: ProjectileId,
    ) -> Handled {
        let player_id = self
            .world
            .player_by_connection(connection_id)
            .ok_or(Rejection::UnknownPlayer)?
            .id;
        if projectile_id.owner_id != player_id {
            return Err(Rejection::OwnerMismatch);
        }
        let recorded_owner = self.world.projectiles().get(&projectile_id).map(|p| p.owner_id);
        if recorded_owner.is_some_and(|owner| owner != player_id) {
            return Err(Rejection::OwnerMismatch);
        }

        self.world.projectiles_mut().remove(&projectile_id);
        Ok(vec![Outbound::all_except(
            connection_id,
            ServerEvent::BulletDestroyed {
                projectile_id,
                player_id,
            },
        )])
    }

    /// Refills every magazine whose reload deadline has passed.
    pub fn complete_due_reloads(&mut self) -> Vec<Outbound> {
        let now = self.now();
        let mut out = Vec::new();

        for (player_id, weapon) in self.reloads.take_due(now) {
            let spec = weapon.spec();
            let Some(player) = self.world.player_by_id_mut(player_id) else {
                debug!(player_id, ?weapon, "reload owner gone");
                continue;
            };
            if !player.is_alive() {
                continue;
            }
            let connection_id = player.connection_id;
            let Some(slot) = player.inventory.slot_mut(weapon) else {
                debug!(player_id, ?weapon, "reloaded weapon no longer held");
                continue;
            };

            let missing = spec.magazine_size.saturating_sub(slot.magazine);
            if spec.infinite_ammo {
                slot.magazine = spec.magazine_size;
            } else {
                let loaded = missing.min(slot.reserve);
                slot.magazine += loaded;
                slot.reserve -= loaded;
            }

            out.push(Outbound::only(
                connection_id,
                ServerEvent::ReloadComplete {
                    weapon,
                    magazine: slot.magazine,
                    reserve: slot.reserve,
                },
            ));
        }
        out
    }

    /// Simulation step; projectile aging only, movement is client-authored.
    pub fn step(&mut self, dt: f32) {
        self.world.tick(dt);
    }

    pub fn snapshot_broadcast(&self) -> Outbound {
        Outbound::all(ServerEvent::State(self.world.snapshot(self.now())))
    }
}
