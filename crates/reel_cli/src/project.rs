//! Project files and scaffolding

use anyhow::{Context, Result};
use reel_core::authoring::retime;
use reel_core::{CharacterPath, Effect, Project, Role, SurvivorEffect, TimelineConfig, Waypoint};
use std::fs;
use std::path::Path;

use crate::config::{ReelConfig, CONFIG_FILE};

/// File name of the storyboard written by `reel init`
pub const PROJECT_FILE: &str = "project.json";

/// Read a project from JSON, clamping its timeline into editor ranges
pub fn load_project(path: &Path) -> Result<Project> {
    let path = if path.is_dir() {
        path.join(PROJECT_FILE)
    } else {
        path.to_path_buf()
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut project: Project = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let clamped = project.timeline.clamped();
    if clamped != project.timeline {
        tracing::warn!(
            requested = ?project.timeline,
            applied = ?clamped,
            "timeline values out of range, clamped"
        );
        project.timeline = clamped;
    }

    Ok(project)
}

pub fn save_project(path: &Path, project: &Project) -> Result<()> {
    let json = serde_json::to_string_pretty(project).context("Failed to serialize project")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Create a new storyboard directory with reel.toml and a sample project
pub fn create_project(path: &Path, name: &str) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let config = ReelConfig::default();
    fs::write(path.join(CONFIG_FILE), config.to_toml()?)?;

    let project = sample_project(name, config.roster.max_survivors)?;
    save_project(&path.join(PROJECT_FILE), &project)?;

    Ok(())
}

/// A small chase: the killer hunts the first survivor while the second escapes
pub fn sample_project(name: &str, max_survivors: usize) -> Result<Project> {
    let mut project = Project::new(name).with_timeline(TimelineConfig {
        action_duration: 12.0,
        killer_delay: 2.0,
        start_pause: 1.0,
        end_pause: 2.0,
    });
    project.max_survivors = max_survivors;

    let killer = project.add_character(Role::Killer)?.id.clone();
    let victim = project.add_character(Role::Survivor)?.id.clone();
    let runner = project.add_character(Role::Survivor)?.id.clone();

    let killer_points = vec![
        Waypoint::new(100.0, 300.0, 0.0),
        Waypoint::new(300.0, 300.0, 0.0),
        Waypoint::new(500.0, 200.0, 0.0)
            .with_dwell(1.0)
            .with_effect(Effect::kill(victim.clone())),
        Waypoint::new(700.0, 200.0, 0.0),
    ];
    let victim_points = vec![
        Waypoint::new(400.0, 100.0, 0.0),
        Waypoint::new(500.0, 200.0, 0.0)
            .with_dwell(4.0)
            .with_effect(SurvivorEffect::Hiding),
    ];
    let runner_points = vec![
        Waypoint::new(200.0, 500.0, 0.0),
        Waypoint::new(600.0, 500.0, 0.0),
        Waypoint::new(900.0, 450.0, 0.0).with_effect(SurvivorEffect::Escaped),
    ];

    for (owner, points) in [
        (killer, killer_points),
        (victim, victim_points),
        (runner, runner_points),
    ] {
        let path = CharacterPath::new(owner);
        let points = retime(&points, path.speed)?;
        project.set_path(path.with_points(points))?;
    }

    Ok(project)
}
