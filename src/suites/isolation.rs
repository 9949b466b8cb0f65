// src/suites/isolation.rs
// Two tenants side by side; each must only ever see its own data

use serde_json::json;

use super::{PlanOptions, UPDATED_CODE, compile_for, composition, registration};
use crate::actor::{ActorSlot, ResourceKind};
use crate::api::{self, FolderDraft, ProjectDraft, ProjectPatch};
use crate::scenario::{Capture, Check, Plan, Scenario, Step};

const USER1: ActorSlot = ActorSlot::Primary;
const USER2: ActorSlot = ActorSlot::Secondary;

fn folder_draft(slot: ActorSlot) -> FolderDraft {
    let n = if slot == USER1 { 1 } else { 2 };
    FolderDraft {
        name: format!("User {n} Test Folder"),
        description: format!("Test folder for user {n}"),
    }
}

/// Create a folder and capture it for `slot`
fn create_folder(name: &str, slot: ActorSlot) -> Step {
    Step::fixed(name, api::create_folder(&folder_draft(slot)))
        .by(slot)
        .capture(Capture::Resource(ResourceKind::Folder))
}

/// Create a project inside `slot`'s own folder and capture it
fn create_project(name: &str, slot: ActorSlot) -> Step {
    let (n, tempo) = if slot == USER1 { (1, 120) } else { (2, 140) };
    Step::new(name, move |r| {
        Ok(api::create_project(&ProjectDraft {
            name: format!("User {n} Test Project"),
            description: format!("Test project for user {n}"),
            folder_id: Some(r.require(slot, ResourceKind::Folder)?.to_string()),
            jmon_code: format!(
                "// User {n} JMON code\nconst composition = {{ tracks: [], tempo: {tempo} }};\nreturn composition;"
            ),
            jmon_object: None,
        }))
    })
    .by(slot)
    .capture(Capture::Resource(ResourceKind::Project))
}

pub fn plan(options: &PlanOptions) -> Plan {
    let project_patch = ProjectPatch {
        name: Some("Updated User 1 Project".to_string()),
        description: None,
        jmon_code: Some(UPDATED_CODE.to_string()),
        jmon_object: Some(composition(140, json!([{"name": "Test Track", "notes": []}]))),
    };

    let mut plan = Plan::new("isolation", &[USER1, USER2])
        .scenario(
            Scenario::new("Registration")
                .step(registration("User 1 Registration", USER1))
                .step(registration("User 2 Registration", USER2))
                .step(
                    Step::new("Duplicate Registration Prevention", |r| {
                        Ok(api::register(&r.profile(USER1)?.registration()))
                    })
                    .expect(400),
                ),
        )
        .scenario(
            Scenario::new("Authentication")
                .step(
                    Step::fixed("Get Current User Info", api::me())
                        .by(USER1)
                        .check(Check::IdentifiesActor(USER1)),
                )
                .step(
                    Step::fixed("Invalid Token Rejection", api::me())
                        .with_token("invalid_token")
                        .expect(401),
                ),
        )
        .scenario(
            Scenario::new("Folder Isolation")
                .step(create_folder("User 1 Folder Creation", USER1))
                .step(create_folder("User 2 Folder Creation", USER2))
                .step(
                    Step::fixed("Folder Data Isolation", api::list_folders())
                        .by(USER1)
                        .check(Check::ListIncludes(USER1, ResourceKind::Folder))
                        .check(Check::ListExcludes(USER2, ResourceKind::Folder)),
                )
                .step(
                    Step::new("Cross-User Folder Update Prevention", |r| {
                        Ok(api::update_folder(
                            r.require(USER1, ResourceKind::Folder)?,
                            &FolderDraft {
                                name: "Hijacked Folder".to_string(),
                                description: "Written by another tenant".to_string(),
                            },
                        ))
                    })
                    .by(USER2)
                    .expect(404),
                ),
        )
        .scenario(
            Scenario::new("Project Isolation")
                .step(create_project("User 1 Project Creation", USER1))
                .step(create_project("User 2 Project Creation", USER2))
                .step(
                    Step::new("Project Read After Write", |r| {
                        Ok(api::get_project(r.require(USER1, ResourceKind::Project)?))
                    })
                    .by(USER1)
                    .check(Check::ReturnsResource(USER1, ResourceKind::Project)),
                )
                .step(
                    Step::fixed("Project Data Isolation", api::list_projects(None))
                        .by(USER1)
                        .check(Check::ListIncludes(USER1, ResourceKind::Project))
                        .check(Check::ListExcludes(USER2, ResourceKind::Project)),
                )
                .step(
                    Step::new("Cross-User Project Access Prevention", |r| {
                        Ok(api::get_project(r.require(USER2, ResourceKind::Project)?))
                    })
                    .by(USER1)
                    .expect(404),
                ),
        )
        .scenario(
            Scenario::new("Compilation & Playback")
                .step(Step::new("JMON Code Compilation", compile_for(USER1)).by(USER1))
                .step(
                    Step::new("Project Play Tracking", |r| {
                        Ok(api::play_project(r.require(USER1, ResourceKind::Project)?))
                    })
                    .by(USER1),
                ),
        )
        .scenario(
            Scenario::new("Analytics")
                .step(
                    Step::fixed("Usage Statistics", api::usage_stats())
                        .by(USER1)
                        .check(Check::HasField("total_projects")),
                )
                .step(Step::fixed("Activity Tracking", api::activity(Some(7))).by(USER1)),
        )
        .scenario(
            Scenario::new("Updates").step(
                Step::new("Project Update", move |r| {
                    Ok(api::update_project(
                        r.require(USER1, ResourceKind::Project)?,
                        &project_patch,
                    ))
                })
                .by(USER1),
            ),
        )
        .scenario(
            Scenario::new("Access Control")
                .step(
                    Step::fixed("Unauthorized Project Access", api::list_projects(None))
                        .expect_any(&[401, 403]),
                )
                .step(
                    Step::fixed("Unauthorized Folder Access", api::list_folders())
                        .expect_any(&[401, 403]),
                ),
        );

    if options.cleanup {
        let mut cleanup = Scenario::new("Cleanup");
        for (slot, n) in [(USER1, 1), (USER2, 2)] {
            cleanup = cleanup
                .step(
                    Step::new(format!("User {n} Project Cleanup"), move |r| {
                        Ok(api::delete_project(r.require(slot, ResourceKind::Project)?))
                    })
                    .by(slot)
                    .capture(Capture::Release(ResourceKind::Project)),
                )
                .step(
                    Step::new(format!("User {n} Folder Cleanup"), move |r| {
                        Ok(api::delete_folder(r.require(slot, ResourceKind::Folder)?))
                    })
                    .by(slot)
                    .capture(Capture::Release(ResourceKind::Folder)),
                );
        }
        plan = plan.scenario(cleanup);
    }

    plan
}
