use super::config::Config as AppleConfig;
use crate::task::{self, Task};

pub fn tasks(apple: &AppleConfig) -> Vec<Task> {
    let release = apple.release();
    let mut tasks = vec![
        Task::alchemy("build-common", "Build ios common code", &["all", "sdk"], None).weak(),
        Task::alchemy("clean-common", "Clean ios common code", &["clobber"], None).weak(),
    ];
    for build in apple.xcodebuild_tasks() {
        tasks.push(Task::meta(&build.name, &build.desc).with_subtasks(build.subtasks.clone()));
    }
    for xctool in apple.xctool_tasks() {
        tasks.push(Task::meta(&xctool.name, &xctool.desc).with_subtasks(xctool.subtasks.clone()));
    }
    for jazzy in apple.jazzy_tasks() {
        tasks.push(Task::meta(&jazzy.name, &jazzy.desc).with_subtasks(jazzy.subtasks.clone()));
    }
    for app in apple.apps() {
        tasks.push(
            Task::meta(app.task_name(), app.task_desc())
                .with_subtasks(vec![release.build_common_task.clone()]),
        );
    }
    tasks.push(Task::overriding(task::IMAGES_TASK, "Assemble release images"));
    tasks.push(task::release(task::release_subtasks(
        apple.apps().iter().map(|app| app.task_name()),
        &release.extra_tasks,
    )));
    tasks
}
