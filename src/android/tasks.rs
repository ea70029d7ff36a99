use super::{abi::Abi, genproject};
use crate::{
    config::Config,
    opts::Sanitizer,
    task::{self, Task},
};

pub fn build_common_name(abi: Abi) -> String {
    format!("build-common-{}", abi)
}

pub fn clean_common_name(abi: Abi) -> String {
    format!("clean-common-{}", abi)
}

/// The default ABI, provided it's among the ones being built.
pub fn default_abi(config: &Config, abis: &[Abi]) -> Option<Abi> {
    let default_abi = config.android().default_abi();
    if abis.contains(&default_abi) {
        Some(default_abi)
    } else {
        log::error!(
            "Default android abi ({}) is not in {:?}",
            default_abi,
            abis.iter().map(|abi| abi.as_str()).collect::<Vec<_>>()
        );
        None
    }
}

pub fn tasks(config: &Config, abis: &[Abi], sanitizer: Sanitizer) -> Vec<Task> {
    let android = config.android();
    let mut tasks = Vec::new();

    for &abi in abis {
        let asan = if sanitizer.address() {
            "set up"
        } else {
            "clean"
        };
        tasks.push(
            Task::alchemy(
                build_common_name(abi),
                format!(
                    "Build android common for {} ({} address sanitizer runtime)",
                    abi, asan
                ),
                &["all", "sdk"],
                Some(abi.to_string()),
            )
            .weak(),
        );
        tasks.push(
            Task::alchemy(
                clean_common_name(abi),
                format!("Clean android common for {}", abi),
                &["clobber"],
                Some(abi.to_string()),
            )
            .weak(),
        );
    }

    if let Some(default_abi) = default_abi(config, abis) {
        tasks.push(Task {
            kind: task::Kind::Alchemy {
                default_args: Vec::new(),
                out_subdir: Some(default_abi.to_string()),
            },
            ..Task::overriding("alchemy", format!("Run alchemy for {}", default_abi))
        });
        for kind in genproject::Kind::ALL {
            tasks.push(Task::overriding(kind.task_name(), kind.desc()));
        }
    }

    tasks.push(
        Task::meta(
            "build-common",
            "Build android common code for all architectures",
        )
        .with_subtasks(abis.iter().map(|&abi| build_common_name(abi)))
        .weak(),
    );
    tasks.push(
        Task::meta(
            "clean-common",
            "Clean android common code for all architectures",
        )
        .with_subtasks(abis.iter().map(|&abi| clean_common_name(abi)))
        .weak(),
    );

    for gradle in android.gradle_tasks() {
        tasks.push(Task::meta(&gradle.name, &gradle.desc).with_subtasks(gradle.subtasks.clone()));
    }
    for ndk_build in android.ndk_build_tasks() {
        tasks.push(
            Task::meta(&ndk_build.name, &ndk_build.desc).with_subtasks(ndk_build.subtasks.clone()),
        );
    }

    let release = android.release();
    tasks.push(Task::overriding(task::IMAGES_TASK, "Assemble release images"));
    tasks.push(task::release(task::release_subtasks(
        std::iter::once(release.build_task.clone()),
        &release.extra_tasks,
    )));
    tasks
}
