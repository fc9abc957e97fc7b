//! Text formats for levels, objective lists, and action scripts.
//! This module exists so every way content enters the engine is parsed in
//! one place. It does not own any simulation rules.
//!
//! A level has two blank-line-separated parts. The first is the board: cell
//! characters sit on even rows and columns, the characters between them
//! describe connections (`-`, `|`, `+` open; `r`/`g`/`b`/`y` locked doors;
//! space for none). The optional second part defines subroutines, one per
//! line, named by a digit or greek letter; a board cell carrying that name
//! runs the subroutine's `;`-separated statements, e.g.
//! `1: e(b,w); key(red)`.

use std::collections::BTreeMap;

use crate::game::Action;
use crate::objective::Objective;
use crate::route::Route;
use crate::state::{
    Costume, Enemy, EnemyKind, GameState, IdAlloc, Item, ItemKind, Node, NodeKind, NodeMap,
    Operative,
};
use crate::types::{Direction, EdgeKind, Point};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    TooManyParts,
    UnknownCharacter { c: char, x: i32, y: i32 },
    UnknownEdgeCharacter { c: char, x: i32, y: i32, direction: Direction },
    MapCharacterRowsShouldBeOdd,
    MapCharacterColsShouldBeOdd,
    NoOperative,
    MultipleOperatives,
    SubroutineExpectedOneColon,
    SubroutineRepeatedDefinition,
    UnknownSubroutine { name: char },
    StatementExpectedOpenParen,
    UnknownGameStatement { name: String },
    UnknownDirection { direction: String },
    UnknownEnemy { enemy: String },
    UnknownKeyType { key_type: String },
    ExpectedNumber { argument: String },
    RouteExpectedFourArgs,
    DegenerateRoute,
    PatrolOffRoute { position: Point },
    SubwayArgs,
    SuitArgs,
    StatueExpectedDirectionArgument,
    WalkwayExpectedDirectionArgument,
}

pub fn parse_level(level: &str, ids: &mut IdAlloc) -> Result<GameState, ParseError> {
    let parts: Vec<&str> = level.split("\n\n").collect();
    if parts.len() > 2 {
        return Err(ParseError::TooManyParts);
    }

    let mut subroutines: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if parts.len() > 1 {
        for line in parts[1].lines() {
            let pieces: Vec<&str> = line.split(':').collect();
            if pieces.len() != 2 {
                return Err(ParseError::SubroutineExpectedOneColon);
            }
            let name = pieces[0].trim().to_string();
            let statements: Vec<String> =
                pieces[1].split(';').map(|s| s.trim().to_string()).collect();
            if subroutines.insert(name, statements).is_some() {
                return Err(ParseError::SubroutineRepeatedDefinition);
            }
        }
    }

    let rows: Vec<Vec<char>> = parts[0].lines().map(|line| line.chars().collect()).collect();
    let max_cx = rows.iter().map(Vec::len).max().unwrap_or(0);
    if max_cx % 2 == 0 {
        return Err(ParseError::MapCharacterColsShouldBeOdd);
    }
    let max_cy = rows.len();
    if max_cy % 2 == 0 {
        return Err(ParseError::MapCharacterRowsShouldBeOdd);
    }
    let max_x = (max_cx as i32 + 1) / 2;
    let max_y = (max_cy as i32 + 1) / 2;

    // Ragged rows read as space beyond their end.
    let at = |cx: i32, cy: i32| -> char {
        if cx < 0 || cy < 0 {
            return ' ';
        }
        rows.get(cy as usize).and_then(|row| row.get(cx as usize)).copied().unwrap_or(' ')
    };

    let mut operative: Option<Operative> = None;
    let mut map = NodeMap::new();
    for y in 0..max_y {
        for x in 0..max_x {
            let c = at(2 * x, 2 * y);
            if c == ' ' {
                continue;
            }
            let mut node = Node::default();
            match c {
                'A' => {
                    if operative.is_some() {
                        return Err(ParseError::MultipleOperatives);
                    }
                    operative = Some(Operative::new(x, y));
                }
                'a' => {
                    if operative.is_some() {
                        return Err(ParseError::MultipleOperatives);
                    }
                    let mut trenchcoated = Operative::new(x, y);
                    trenchcoated.costume = Costume::Trenchcoat;
                    operative = Some(trenchcoated);
                }
                'C' => node.item = Some(item(ids, ItemKind::Briefcase)),
                'E' => node.item = Some(item(ids, ItemKind::Pistols)),
                'G' => node.item = Some(item(ids, ItemKind::Gun)),
                'P' => node.item = Some(item(ids, ItemKind::Plant)),
                'R' => node.item = Some(item(ids, ItemKind::Rock)),
                'T' => node.kind = NodeKind::Target,
                'W' => node.item = Some(item(ids, ItemKind::WaitPoint)),
                'X' => node.kind = NodeKind::Exit,
                'r' => node.item = Some(item(ids, ItemKind::Key { color: EdgeKind::Red })),
                'g' => node.item = Some(item(ids, ItemKind::Key { color: EdgeKind::Green })),
                'b' => node.item = Some(item(ids, ItemKind::Key { color: EdgeKind::Blue })),
                'y' => node.item = Some(item(ids, ItemKind::Key { color: EdgeKind::Yellow })),
                '+' | '-' | '|' => {}
                '0'..='9' | 'α'..='ω' => {
                    let Some(statements) = subroutines.get(&c.to_string()) else {
                        return Err(ParseError::UnknownSubroutine { name: c });
                    };
                    for statement in statements {
                        apply_statement(
                            statement,
                            Point::new(x, y),
                            &mut node,
                            &mut operative,
                            ids,
                        )?;
                    }
                }
                _ => return Err(ParseError::UnknownCharacter { c, x, y }),
            }
            for direction in Direction::ALL {
                let edge_char = at(2 * x + direction.dx(), 2 * y + direction.dy());
                match parse_edge_char(edge_char) {
                    Ok(None) => {}
                    Ok(Some(kind)) => {
                        node.edges.insert(direction, kind);
                    }
                    Err(()) => {
                        return Err(ParseError::UnknownEdgeCharacter {
                            c: edge_char,
                            x,
                            y,
                            direction,
                        });
                    }
                }
            }
            map.insert(Point::new(x, y), node);
        }
    }

    let Some(operative) = operative else {
        return Err(ParseError::NoOperative);
    };
    Ok(GameState { map, operative })
}

fn item(ids: &mut IdAlloc, kind: ItemKind) -> Item {
    Item { id: ids.allocate(), kind }
}

fn apply_statement(
    statement: &str,
    pos: Point,
    node: &mut Node,
    operative: &mut Option<Operative>,
    ids: &mut IdAlloc,
) -> Result<(), ParseError> {
    let pieces: Vec<&str> = statement.split('(').map(str::trim).collect();
    if pieces.len() != 2 {
        return Err(ParseError::StatementExpectedOpenParen);
    }
    let name = pieces[0];
    let args: Vec<&str> =
        pieces[1].split(')').next().unwrap_or("").split(',').map(str::trim).collect();

    match name {
        "briefcase" => node.item = Some(item(ids, ItemKind::Briefcase)),
        "enemy" | "e" => {
            let (kind, armored, facing) = parse_enemy_args(&args, pos)?;
            node.enemies.push(Enemy::new(ids.allocate(), kind, armored, facing));
        }
        "exit" => node.kind = NodeKind::Exit,
        "gun" => node.item = Some(item(ids, ItemKind::Gun)),
        "operative" => {
            if operative.is_some() {
                return Err(ParseError::MultipleOperatives);
            }
            *operative = Some(Operative::new(pos.x, pos.y));
        }
        "key" => {
            let color = parse_key_type(args.first().copied().unwrap_or_default())?;
            node.item = Some(item(ids, ItemKind::Key { color }));
        }
        "pistols" => node.item = Some(item(ids, ItemKind::Pistols)),
        "plant" => node.item = Some(item(ids, ItemKind::Plant)),
        "rock" => node.item = Some(item(ids, ItemKind::Rock)),
        "statue" => {
            if args.len() != 1 {
                return Err(ParseError::StatueExpectedDirectionArgument);
            }
            node.kind = NodeKind::Statue { facing: parse_direction_name(args[0])? };
        }
        "subway" => {
            if args.len() != 2 {
                return Err(ParseError::SubwayArgs);
            }
            let mut chars = args[0].chars();
            let (Some(subway_name), None) = (chars.next(), chars.next()) else {
                return Err(ParseError::SubwayArgs);
            };
            node.kind = NodeKind::Subway { name: subway_name, peers: args[1].to_string() };
        }
        "suit" => {
            if args.len() != 1 {
                return Err(ParseError::SuitArgs);
            }
            let (kind, _, _) = parse_enemy_args(&[args[0], "e"], pos)?;
            node.item = Some(item(ids, ItemKind::Suit { kind }));
        }
        "target" => node.kind = NodeKind::Target,
        "walkway" => {
            if args.len() != 1 {
                return Err(ParseError::WalkwayExpectedDirectionArgument);
            }
            node.kind = NodeKind::Walkway { facing: parse_direction_name(args[0])? };
        }
        other => return Err(ParseError::UnknownGameStatement { name: other.to_string() }),
    }
    Ok(())
}

fn parse_direction_name(direction: &str) -> Result<Direction, ParseError> {
    match direction {
        "n" | "north" => Ok(Direction::North),
        "e" | "east" => Ok(Direction::East),
        "s" | "south" => Ok(Direction::South),
        "w" | "west" => Ok(Direction::West),
        _ => Err(ParseError::UnknownDirection { direction: direction.to_string() }),
    }
}

fn parse_number(argument: &str) -> Result<i32, ParseError> {
    argument.parse().map_err(|_| ParseError::ExpectedNumber { argument: argument.to_string() })
}

fn parse_route_args(args: &[&str]) -> Result<Route, ParseError> {
    if args.len() != 4 {
        return Err(ParseError::RouteExpectedFourArgs);
    }
    let top_left = Point::new(parse_number(args[0])?, parse_number(args[1])?);
    let bottom_right = Point::new(parse_number(args[2])?, parse_number(args[3])?);
    Route::new(top_left, bottom_right).ok_or(ParseError::DegenerateRoute)
}

fn parse_enemy_args(
    args: &[&str],
    pos: Point,
) -> Result<(EnemyKind, bool, Direction), ParseError> {
    let facing = || parse_direction_name(args.get(1).copied().unwrap_or_default());
    match args[0] {
        "b" | "blue" => Ok((EnemyKind::Blue, false, facing()?)),
        "B" | "blue_armored" => Ok((EnemyKind::Blue, true, facing()?)),
        "d" | "dog" => Ok((EnemyKind::Dog { chasing: Vec::new() }, false, facing()?)),
        "g" | "green" => Ok((EnemyKind::Green, false, facing()?)),
        "2" | "duo" => Ok((EnemyKind::Duo, false, facing()?)),
        "f" | "flashlight" => Ok((EnemyKind::Flashlight, false, facing()?)),
        "m" | "mark" => Ok((EnemyKind::Mark, false, facing()?)),
        "p" | "patrol" => {
            let route = parse_route_args(&args[1..])?;
            let facing =
                route.facing(pos, true).map_err(|_| ParseError::PatrolOffRoute { position: pos })?;
            Ok((EnemyKind::Patrol { route }, false, facing))
        }
        "s" | "sniper" => Ok((EnemyKind::Sniper, false, facing()?)),
        "y" | "yellow" => Ok((EnemyKind::Yellow, false, facing()?)),
        "Y" | "yellow_armored" => Ok((EnemyKind::Yellow, true, facing()?)),
        other => Err(ParseError::UnknownEnemy { enemy: other.to_string() }),
    }
}

fn parse_key_type(key_type: &str) -> Result<EdgeKind, ParseError> {
    match key_type {
        "r" | "red" => Ok(EdgeKind::Red),
        "b" | "blue" => Ok(EdgeKind::Blue),
        "g" | "green" => Ok(EdgeKind::Green),
        "y" | "yellow" => Ok(EdgeKind::Yellow),
        _ => Err(ParseError::UnknownKeyType { key_type: key_type.to_string() }),
    }
}

fn parse_edge_char(c: char) -> Result<Option<EdgeKind>, ()> {
    match c {
        ' ' => Ok(None),
        '-' | '|' | '+' => Ok(Some(EdgeKind::Open)),
        'r' => Ok(Some(EdgeKind::Red)),
        'g' => Ok(Some(EdgeKind::Green)),
        'b' => Ok(Some(EdgeKind::Blue)),
        'y' => Ok(Some(EdgeKind::Yellow)),
        _ => Err(()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectiveParseError {
    UnknownObjective { objective: String },
}

/// Comma-separated objective names, e.g. `"LevelComplete, NoKill"`.
pub fn parse_objectives(text: &str) -> Result<Vec<Objective>, ObjectiveParseError> {
    text.split(',').map(|part| parse_objective(part.trim())).collect()
}

pub fn parse_objective(text: &str) -> Result<Objective, ObjectiveParseError> {
    match text {
        "CollectBriefcase" => Ok(Objective::CollectBriefcase),
        "DontKillDogs" => Ok(Objective::DontKillDogs),
        "KillAllEnemies" => Ok(Objective::KillAllEnemies),
        "KillYourMark" => Ok(Objective::KillYourMark),
        "LevelComplete" => Ok(Objective::LevelComplete),
        "NoKill" => Ok(Objective::NoKill),
        "SpeedKill" => Ok(Objective::SpeedKill),
        _ => parse_level_complete_within(text)
            .ok_or_else(|| ObjectiveParseError::UnknownObjective { objective: text.to_string() }),
    }
}

fn parse_level_complete_within(text: &str) -> Option<Objective> {
    let (name, rest) = text.split_once('(')?;
    if name.trim() != "LevelCompleteWithin" {
        return None;
    }
    let (argument, _) = rest.split_once(')')?;
    let turns: u32 = argument.trim().parse().ok()?;
    Some(Objective::LevelCompleteWithin { turns })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionParseError {
    ExpectedDirection,
    MalformedPoint,
    ExpectedPeerName,
}

/// Parse a comma-separated action script, e.g. `"N,E,toss S,fire (1,2)"`.
/// Parsing stops quietly at the first token that is not an action; an
/// action keyword with malformed arguments is an error.
pub fn parse_actions(text: &str) -> Result<Vec<Action>, ActionParseError> {
    let mut input = text;
    let mut actions = Vec::new();
    while let Some(action) = parse_action(&mut input)? {
        actions.push(action);
        if advance(&mut input, ",") {
            let _ = advance(&mut input, " ");
        }
    }
    Ok(actions)
}

fn advance(input: &mut &str, token: &str) -> bool {
    if let Some(rest) = input.strip_prefix(token) {
        *input = rest;
        return true;
    }
    false
}

fn parse_compass(input: &mut &str) -> Option<Direction> {
    for (token, direction) in [
        ("N", Direction::North),
        ("E", Direction::East),
        ("S", Direction::South),
        ("W", Direction::West),
    ] {
        if advance(input, token) {
            return Some(direction);
        }
    }
    None
}

fn parse_int(input: &mut &str) -> Option<i32> {
    let digits = input.len() - input.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let (number, rest) = input.split_at(digits);
    *input = rest;
    number.parse().ok()
}

fn parse_point(input: &mut &str) -> Option<Point> {
    if !advance(input, "(") {
        return None;
    }
    let x = parse_int(input)?;
    if !advance(input, ",") {
        return None;
    }
    let y = parse_int(input)?;
    // The closing paren is optional, matching the writer's leniency.
    let _ = advance(input, ")");
    Some(Point::new(x, y))
}

fn parse_action(input: &mut &str) -> Result<Option<Action>, ActionParseError> {
    if let Some(direction) = parse_compass(input) {
        return Ok(Some(Action::Move { direction }));
    }
    if advance(input, "toss ") {
        let direction = parse_compass(input).ok_or(ActionParseError::ExpectedDirection)?;
        return Ok(Some(Action::Toss { direction }));
    }
    if advance(input, "subway ") {
        let mut chars = input.chars();
        let peer = chars.next().ok_or(ActionParseError::ExpectedPeerName)?;
        *input = chars.as_str();
        return Ok(Some(Action::Subway { peer }));
    }
    if advance(input, "fire ") {
        let target = parse_point(input).ok_or(ActionParseError::MalformedPoint)?;
        return Ok(Some(Action::Fire { target }));
    }
    Ok(None)
}
