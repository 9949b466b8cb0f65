// src/suites/standard.rs
// Single-actor walk through every endpoint

use chrono::Utc;
use serde_json::json;

use super::{PlanOptions, UPDATED_CODE, compile_for, composition, registration};
use crate::actor::{ActorSlot, ResourceKind};
use crate::api::{self, FolderDraft, LoginRequest, ProjectDraft, ProjectPatch};
use crate::scenario::{Capture, Check, Plan, Scenario, Step};

const USER: ActorSlot = ActorSlot::Primary;

pub fn plan(options: &PlanOptions) -> Plan {
    let stamp = Utc::now().format("%H%M%S").to_string();

    let project = ProjectDraft {
        name: format!("Test Project {stamp}"),
        description: "A test project for the project service".to_string(),
        folder_id: None,
        jmon_code: "// Test JMON code\nconst composition = { tracks: [], tempo: 120, timeSignature: '4/4', duration: 4 };\nreturn composition;".to_string(),
        jmon_object: Some(composition(120, json!([]))),
    };
    let project_patch = ProjectPatch {
        name: Some("Updated Test Project".to_string()),
        description: Some("Updated description".to_string()),
        jmon_code: Some(UPDATED_CODE.to_string()),
        jmon_object: None,
    };
    let folder = FolderDraft {
        name: format!("Test Folder {stamp}"),
        description: "A test folder for organizing projects".to_string(),
    };
    let folder_update = FolderDraft {
        name: "Updated Test Folder".to_string(),
        description: "Updated folder description".to_string(),
    };
    let bad_login = LoginRequest {
        username: "nonexistent_user".to_string(),
        password: "wrong_password".to_string(),
    };

    let mut plan = Plan::new("standard", &[USER])
        .scenario(
            Scenario::new("Health & Info")
                .step(Step::fixed("Health Check", api::health()))
                .step(Step::fixed("API Info", api::service_info())),
        )
        .scenario(
            Scenario::new("Authentication")
                .step(registration("User Registration", USER))
                .step(
                    Step::new("User Login", |r| Ok(api::login(&r.profile(USER)?.login())))
                        .on_behalf_of(USER)
                        .capture(Capture::Session),
                )
                .step(Step::fixed("Get User Profile", api::me()).by(USER))
                .step(Step::fixed("Invalid Login", api::login(&bad_login)).expect(401))
                .step(Step::fixed("Unauthorized Access", api::list_projects(None)).expect(401)),
        )
        .scenario(
            Scenario::new("Project Management")
                .step(
                    Step::fixed("Create Project", api::create_project(&project))
                        .by(USER)
                        .capture(Capture::Resource(ResourceKind::Project)),
                )
                .step(Step::fixed("List Projects", api::list_projects(None)).by(USER))
                .step(Step::fixed("List Projects (Root Folder)", api::list_projects(Some(""))).by(USER))
                .step(
                    Step::new("Get Single Project", |r| {
                        Ok(api::get_project(r.require(USER, ResourceKind::Project)?))
                    })
                    .by(USER)
                    .check(Check::ReturnsResource(USER, ResourceKind::Project)),
                )
                .step(
                    Step::new("Update Project", move |r| {
                        Ok(api::update_project(
                            r.require(USER, ResourceKind::Project)?,
                            &project_patch,
                        ))
                    })
                    .by(USER),
                ),
        )
        .scenario(
            Scenario::new("Folder Management")
                .step(
                    Step::fixed("Create Folder", api::create_folder(&folder))
                        .by(USER)
                        .capture(Capture::Resource(ResourceKind::Folder)),
                )
                .step(Step::fixed("List Folders", api::list_folders()).by(USER))
                .step(
                    Step::new("Update Folder", move |r| {
                        Ok(api::update_folder(
                            r.require(USER, ResourceKind::Folder)?,
                            &folder_update,
                        ))
                    })
                    .by(USER),
                ),
        )
        .scenario(
            Scenario::new("Compilation & Analytics")
                .step(Step::new("JMON Compile", compile_for(USER)).by(USER))
                .step(
                    Step::new("Project Play Tracking", |r| {
                        Ok(api::play_project(r.require(USER, ResourceKind::Project)?))
                    })
                    .by(USER),
                )
                .step(Step::fixed("Analytics Stats", api::usage_stats()).by(USER))
                .step(Step::fixed("Analytics Activity", api::activity(None)).by(USER))
                .step(Step::fixed("Analytics Activity (7 days)", api::activity(Some(7))).by(USER)),
        )
        .scenario(
            Scenario::new("Persistence")
                .step(
                    Step::new("Data Persistence - Project", |r| {
                        Ok(api::get_project(r.require(USER, ResourceKind::Project)?))
                    })
                    .by(USER)
                    .check(Check::ReturnsResource(USER, ResourceKind::Project)),
                )
                .step(
                    Step::fixed("Data Persistence - Folder", api::list_folders())
                        .by(USER)
                        .check(Check::ListIncludes(USER, ResourceKind::Folder)),
                ),
        );

    if options.cleanup {
        plan = plan.scenario(
            Scenario::new("Cleanup")
                .step(
                    Step::new("Delete Folder", |r| {
                        Ok(api::delete_folder(r.require(USER, ResourceKind::Folder)?))
                    })
                    .by(USER)
                    .capture(Capture::Release(ResourceKind::Folder)),
                )
                .step(
                    Step::new("Delete Project", |r| {
                        Ok(api::delete_project(r.require(USER, ResourceKind::Project)?))
                    })
                    .by(USER)
                    .capture(Capture::Release(ResourceKind::Project)),
                ),
        );
    }

    plan
}
