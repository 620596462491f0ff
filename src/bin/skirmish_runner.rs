//! Headless Skirmish Runner
//!
//! Pits the tactical engine against a scripted opponent on an open field
//! and prints a JSON (or text) summary. Runs are reproducible per seed.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use vanguard::combat::{ActionTarget, CombatAction};
use vanguard::core::types::{towards, UnitTag, ZoneId};
use vanguard::power::PowerVector;
use vanguard::services::{ThreatFieldPathing, WorldSnapshot};
use vanguard::units::{Unit, UnitType};
use vanguard::zones::{AttackStatus, StatusTransition, Zone, ZoneMap, ZoneOwner};
use vanguard::{Result, TacticalEngine, VanguardConfig};

/// Headless Skirmish Runner - engine vs scripted opponent
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run the tactical engine against a scripted army and report the outcome")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks before the run is called a draw
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Game seconds per tick
    #[arg(long, default_value_t = 0.5)]
    dt: f32,

    /// Own army size
    #[arg(long, default_value_t = 20)]
    own_size: usize,

    /// Enemy army size
    #[arg(long, default_value_t = 20)]
    enemy_size: usize,

    /// Game time at which the scripted enemy starts pushing
    #[arg(long, default_value_t = 60.0)]
    enemy_push_at: f32,

    /// Engine config (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Debug-level engine logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

const OWN_HOME: Vec2 = Vec2::new(10.0, 50.0);
const ENEMY_HOME: Vec2 = Vec2::new(90.0, 50.0);
const DAMAGE_PER_POWER: f32 = 8.0;
const WEAPON_PERIOD: f32 = 1.0;
const ENERGY_REGEN: f32 = 0.8;
const ENERGY_MAX: f32 = 200.0;

const OWN_ROSTER: &[UnitType] = &[
    UnitType::Rifleman,
    UnitType::Ranger,
    UnitType::Brawler,
    UnitType::Juggernaut,
    UnitType::Tracker,
    UnitType::Sentinel,
    UnitType::Lancer,
    UnitType::Warden,
];

const ENEMY_ROSTER: &[UnitType] = &[
    UnitType::Rifleman,
    UnitType::Brawler,
    UnitType::Hound,
    UnitType::Tracker,
    UnitType::Bombard,
    UnitType::Gunship,
    UnitType::Interceptor,
];

#[derive(Serialize)]
struct SkirmishReport {
    seed: u64,
    ticks: u64,
    game_time: f32,
    outcome: String,
    own_remaining: usize,
    enemy_remaining: usize,
    own_power_left: f32,
    enemy_power_left: f32,
    commands_issued: usize,
    abilities_cast: usize,
    final_status: AttackStatus,
    transitions: Vec<StatusTransition>,
}

/// What a simulated unit does this step
#[derive(Debug, Clone, Copy)]
enum Order {
    Hold,
    Move(Vec2),
    AttackMove(Vec2),
    AttackUnit(UnitTag),
}

impl From<&CombatAction> for Order {
    fn from(action: &CombatAction) -> Self {
        match (action.target, action.is_attack) {
            (ActionTarget::Unit(tag), true) => Order::AttackUnit(tag),
            (ActionTarget::Unit(_), false) => Order::Hold,
            (ActionTarget::Point(p), true) => Order::AttackMove(p),
            (ActionTarget::Point(p), false) => Order::Move(p),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => VanguardConfig::load(path)?,
        None => VanguardConfig::default(),
    };
    let mut engine = TacticalEngine::new(config)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut own = spawn_army(&mut rng, OWN_ROSTER, args.own_size, OWN_HOME, 1);
    let mut enemy = spawn_army(&mut rng, ENEMY_ROSTER, args.enemy_size, ENEMY_HOME, 10_000);
    own.push(Unit::new(UnitTag(0), UnitType::Townhall, OWN_HOME - Vec2::new(6.0, 0.0)));
    enemy.push(Unit::new(UnitTag(9_999), UnitType::Townhall, ENEMY_HOME + Vec2::new(6.0, 0.0)));

    let mut zones = ZoneMap::new(vec![
        Zone::new(ZoneId(0), OWN_HOME, 18.0).with_owner(ZoneOwner::Own),
        Zone::new(ZoneId(1), Vec2::new(50.0, 50.0), 18.0),
        Zone::new(ZoneId(2), ENEMY_HOME, 18.0).as_enemy_start(),
    ]);

    tracing::info!(seed, own = own.len(), enemy = enemy.len(), "skirmish starting");

    let mut time = 0.0;
    let mut ticks = 0;
    let mut commands_issued = 0;
    let mut abilities_cast = 0;
    let mut transitions = Vec::new();
    let mut status = AttackStatus::Inactive;

    while ticks < args.ticks && has_army(&own) && has_army(&enemy) {
        ticks += 1;
        time += args.dt;

        let mut world = WorldSnapshot::new(time);
        world.own_units = own.clone();
        world.enemy_units = enemy.clone();
        world.supply_used = own.iter().filter(|u| u.unit_type.is_army()).count() as f32 * 2.0;
        world.home = OWN_HOME;
        world.rally_point = OWN_HOME + Vec2::new(8.0, 0.0);

        let pathing = ThreatFieldPathing::from_enemies(&world.enemy_units);
        let report = engine.tick(&world, &mut zones, &pathing);
        status = report.status;
        transitions.extend(report.transition);
        commands_issued += report.actions.len();

        let mut orders: Vec<Order> = vec![Order::Hold; own.len()];
        for action in &report.actions {
            let Some(index) = action.actor.and_then(|tag| own.iter().position(|u| u.tag == tag)) else {
                continue;
            };
            if let Some(ability) = action.ability {
                let unit = &mut own[index];
                unit.energy = (unit.energy - ability.energy_cost()).max(0.0);
                abilities_cast += 1;
                continue;
            }
            orders[index] = Order::from(action);
        }

        let enemy_order = if time >= args.enemy_push_at {
            Order::AttackMove(OWN_HOME)
        } else {
            Order::Hold
        };
        let enemy_orders = vec![enemy_order; enemy.len()];

        for (index, order) in orders.into_iter().enumerate() {
            step_unit(&mut own[index], &mut enemy, order, args.dt);
        }
        for (index, order) in enemy_orders.into_iter().enumerate() {
            step_unit(&mut enemy[index], &mut own, order, args.dt);
        }

        own.retain(|u| u.health > 0.0);
        enemy.retain(|u| u.health > 0.0);

        if args.verbose {
            eprintln!(
                "[{:>4}] t={:>6.1} status={:?} own={} enemy={} commands={}",
                ticks,
                time,
                status,
                own.len(),
                enemy.len(),
                report.actions.len()
            );
        }
    }

    let outcome = match (has_army(&own), has_army(&enemy)) {
        (true, false) => "Victory",
        (false, true) => "Defeat",
        (false, false) => "MutualDestruction",
        (true, true) => "Draw",
    };

    let report = SkirmishReport {
        seed,
        ticks,
        game_time: time,
        outcome: outcome.to_string(),
        own_remaining: own.iter().filter(|u| u.unit_type.is_army()).count(),
        enemy_remaining: enemy.iter().filter(|u| u.unit_type.is_army()).count(),
        own_power_left: PowerVector::of_units(&own).total,
        enemy_power_left: PowerVector::of_units(&enemy).total,
        commands_issued,
        abilities_cast,
        final_status: status,
        transitions,
    };

    match args.format.as_str() {
        "text" => {
            println!("Skirmish Result");
            println!("===============");
            println!("Outcome: {}", report.outcome);
            println!("Ticks: {} ({:.1}s)", report.ticks, report.game_time);
            println!("Own remaining: {} ({:.1} power)", report.own_remaining, report.own_power_left);
            println!("Enemy remaining: {} ({:.1} power)", report.enemy_remaining, report.enemy_power_left);
            println!("Commands: {}, abilities: {}", report.commands_issued, report.abilities_cast);
            println!("Final status: {:?}", report.final_status);
            for t in &report.transitions {
                println!("  [{:>6.1}] {:?} -> {:?} ({})", t.at, t.from, t.to, t.reason);
            }
            println!("Seed: {}", report.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn spawn_army(rng: &mut ChaCha8Rng, roster: &[UnitType], size: usize, home: Vec2, first_tag: u64) -> Vec<Unit> {
    (0..size)
        .map(|i| {
            let unit_type = roster[rng.gen_range(0..roster.len())];
            let offset = Vec2::new(rng.gen_range(-4.0..4.0), rng.gen_range(-6.0..6.0));
            Unit::new(UnitTag(first_tag + i as u64), unit_type, home + offset).with_energy(75.0)
        })
        .collect()
}

fn has_army(units: &[Unit]) -> bool {
    units.iter().any(|u| u.unit_type.is_army())
}

/// Advance one unit by `dt`: cool down, regenerate, then fire or move
fn step_unit(unit: &mut Unit, foes: &mut [Unit], order: Order, dt: f32) {
    unit.weapon_cooldown = (unit.weapon_cooldown - dt).max(0.0);
    unit.energy = (unit.energy + ENERGY_REGEN * dt).min(ENERGY_MAX);
    unit.order_target = None;

    match order {
        Order::Move(point) => move_toward(unit, point, dt),
        Order::AttackUnit(tag) => match foes.iter().position(|f| f.tag == tag && f.health > 0.0) {
            Some(index) if unit.in_weapon_range(&foes[index], 0.0) => {
                unit.order_target = Some(tag);
                fire(unit, &mut foes[index]);
            }
            Some(index) => {
                let position = foes[index].position;
                move_toward(unit, position, dt);
            }
            None => {
                fire_at_weakest(unit, foes);
            }
        },
        Order::AttackMove(point) => {
            if !fire_at_weakest(unit, foes) {
                move_toward(unit, point, dt);
            }
        }
        Order::Hold => {
            fire_at_weakest(unit, foes);
        }
    }
}

/// Shoot the weakest foe in range; false when nothing is in range
fn fire_at_weakest(unit: &mut Unit, foes: &mut [Unit]) -> bool {
    let target = foes
        .iter()
        .enumerate()
        .filter(|(_, f)| f.health > 0.0 && unit.in_weapon_range(f, 0.0))
        .min_by(|a, b| a.1.effective_health().total_cmp(&b.1.effective_health()))
        .map(|(i, _)| i);
    match target {
        Some(index) => {
            unit.order_target = Some(foes[index].tag);
            fire(unit, &mut foes[index]);
            true
        }
        None => false,
    }
}

fn fire(unit: &mut Unit, target: &mut Unit) {
    if !unit.weapon_ready(0.0) {
        return;
    }
    let mut damage = unit.data().power * DAMAGE_PER_POWER;
    let absorbed = damage.min(target.shield);
    target.shield -= absorbed;
    damage -= absorbed;
    target.health -= damage;
    unit.weapon_cooldown = WEAPON_PERIOD;
}

fn move_toward(unit: &mut Unit, point: Vec2, dt: f32) {
    let step = (unit.speed() * dt).min(unit.position.distance(point));
    unit.position = towards(unit.position, point, step);
}
