//! Stable snapshot hashing for run verification and state deduplication.
//! This module exists to keep hashing concerns away from the simulation
//! code. It does not own replay execution.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::route::Route;
use crate::state::{Costume, Enemy, EnemyKind, GameState, Item, ItemKind, Node, NodeKind};
use crate::types::{Direction, EdgeKind, Point};

impl GameState {
    /// Identity-free digest of the whole state. Two states that compare
    /// equal hash equal: display ids are skipped, as are cell connections
    /// (they match the `Hash` impl, which leaves edges out because they
    /// rarely change after doors open).
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_usize(self.map.len());
        for (&position, node) in &self.map {
            write_point(&mut hasher, position);
            write_node(&mut hasher, node);
        }
        write_point(&mut hasher, self.operative.position);
        hasher.write_u8(u8::from(self.operative.has_briefcase));
        write_costume(&mut hasher, &self.operative.costume);
        hasher.write_u8(u8::from(self.operative.speed_kill));
        hasher.finish()
    }
}

fn write_point(hasher: &mut Xxh3, p: Point) {
    hasher.write_i32(p.x);
    hasher.write_i32(p.y);
}

fn write_direction(hasher: &mut Xxh3, d: Direction) {
    hasher.write_u8(match d {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    });
}

fn write_edge_kind(hasher: &mut Xxh3, kind: EdgeKind) {
    hasher.write_u8(match kind {
        EdgeKind::Open => 0,
        EdgeKind::Red => 1,
        EdgeKind::Green => 2,
        EdgeKind::Blue => 3,
        EdgeKind::Yellow => 4,
    });
}

fn write_node(hasher: &mut Xxh3, node: &Node) {
    write_node_kind(hasher, &node.kind);
    match &node.item {
        None => hasher.write_u8(0),
        Some(item) => {
            hasher.write_u8(1);
            write_item(hasher, item);
        }
    }
    hasher.write_usize(node.enemies.len());
    for enemy in &node.enemies {
        write_enemy(hasher, enemy);
    }
}

fn write_node_kind(hasher: &mut Xxh3, kind: &NodeKind) {
    match kind {
        NodeKind::Exit => hasher.write_u8(0),
        NodeKind::Plain => hasher.write_u8(1),
        NodeKind::Rubble => hasher.write_u8(2),
        NodeKind::Statue { facing } => {
            hasher.write_u8(3);
            write_direction(hasher, *facing);
        }
        NodeKind::Subway { name, peers } => {
            hasher.write_u8(4);
            hasher.write_u32(*name as u32);
            hasher.write(peers.as_bytes());
        }
        NodeKind::Target => hasher.write_u8(5),
        NodeKind::Walkway { facing } => {
            hasher.write_u8(6);
            write_direction(hasher, *facing);
        }
    }
}

fn write_item(hasher: &mut Xxh3, item: &Item) {
    match &item.kind {
        ItemKind::Briefcase => hasher.write_u8(0),
        ItemKind::Gun => hasher.write_u8(1),
        ItemKind::Key { color } => {
            hasher.write_u8(2);
            write_edge_kind(hasher, *color);
        }
        ItemKind::Pistols => hasher.write_u8(3),
        ItemKind::Plant => hasher.write_u8(4),
        ItemKind::Rock => hasher.write_u8(5),
        ItemKind::Suit { kind } => {
            hasher.write_u8(6);
            write_enemy_kind(hasher, kind);
        }
        ItemKind::WaitPoint => hasher.write_u8(7),
    }
}

fn write_enemy_kind(hasher: &mut Xxh3, kind: &EnemyKind) {
    match kind {
        EnemyKind::Blue => hasher.write_u8(0),
        EnemyKind::Yellow => hasher.write_u8(1),
        EnemyKind::Green => hasher.write_u8(2),
        EnemyKind::Duo => hasher.write_u8(3),
        EnemyKind::Dog { chasing } => {
            hasher.write_u8(4);
            hasher.write_usize(chasing.len());
            for &p in chasing {
                write_point(hasher, p);
            }
        }
        EnemyKind::Flashlight => hasher.write_u8(5),
        EnemyKind::Patrol { route } => {
            hasher.write_u8(6);
            write_route(hasher, route);
        }
        EnemyKind::Mark => hasher.write_u8(7),
        EnemyKind::Sniper => hasher.write_u8(8),
    }
}

fn write_route(hasher: &mut Xxh3, route: &Route) {
    write_point(hasher, route.top_left());
    write_point(hasher, route.bottom_right());
}

fn write_costume(hasher: &mut Xxh3, costume: &Costume) {
    match costume {
        Costume::Normal => hasher.write_u8(0),
        Costume::Trenchcoat => hasher.write_u8(1),
        Costume::Suit { kind } => {
            hasher.write_u8(2);
            write_enemy_kind(hasher, kind);
        }
    }
}

fn write_enemy(hasher: &mut Xxh3, enemy: &Enemy) {
    write_enemy_kind(hasher, &enemy.kind);
    hasher.write_u8(u8::from(enemy.armored));
    write_direction(hasher, enemy.facing);
    match enemy.goal {
        None => hasher.write_u8(0),
        Some(goal) => {
            hasher.write_u8(1);
            write_point(hasher, goal);
        }
    }
}
