use agent_domain::{ChatMode, PlayerRef};

use crate::commands::{group_commands, score_commands, tpa_commands};
use crate::{AppError, AppState};

pub const PREFIX: &str = "!";
const ADMIN_TAG: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    User,
    Admin,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub permission: Permission,
    pub description: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        permission: Permission::User,
        description: "Show this command list",
    },
    CommandSpec {
        name: "group:create",
        permission: Permission::User,
        description: "Create a group you own",
    },
    CommandSpec {
        name: "group:join",
        permission: Permission::User,
        description: "Request to join a group",
    },
    CommandSpec {
        name: "group:leave",
        permission: Permission::User,
        description: "Leave a group (owners disband it)",
    },
    CommandSpec {
        name: "group:accept",
        permission: Permission::User,
        description: "Accept a join request, or 'all'",
    },
    CommandSpec {
        name: "group:pending",
        permission: Permission::User,
        description: "Show pending join requests",
    },
    CommandSpec {
        name: "group:chatmode",
        permission: Permission::User,
        description: "Set chat mode to global or group",
    },
    CommandSpec {
        name: "group:chat",
        permission: Permission::User,
        description: "Send a message to your group",
    },
    CommandSpec {
        name: "tpa:request",
        permission: Permission::User,
        description: "Ask to teleport to a player",
    },
    CommandSpec {
        name: "tpa:accept",
        permission: Permission::User,
        description: "Accept a teleport request",
    },
    CommandSpec {
        name: "tpa:deny",
        permission: Permission::User,
        description: "Deny a teleport request",
    },
    CommandSpec {
        name: "tpa:cancel",
        permission: Permission::User,
        description: "Cancel your teleport requests",
    },
    CommandSpec {
        name: "tpa:list",
        permission: Permission::User,
        description: "List pending teleport requests",
    },
    CommandSpec {
        name: "score:hide",
        permission: Permission::User,
        description: "Hide the scoreboard",
    },
    CommandSpec {
        name: "score:show",
        permission: Permission::User,
        description: "Show the scoreboard",
    },
];

/// Route one chat message. Returns `true` when the message was a command
/// and must not reach normal chat, `false` to let it through.
pub async fn dispatch_chat(
    state: &AppState,
    sender: &PlayerRef,
    message: &str,
) -> Result<bool, AppError> {
    let Some(body) = message.trim().strip_prefix(PREFIX) else {
        return route_plain_chat(state, sender, message).await;
    };
    let mut parts = body.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(false);
    };
    let name = name.to_lowercase();
    let args: Vec<&str> = parts.collect();

    let Some(spec) = COMMANDS.iter().find(|spec| spec.name == name) else {
        state
            .host
            .send_message(&sender.id, &format!("§cCommand \"{PREFIX}{name}\" not found!"));
        return Ok(true);
    };

    if spec.permission == Permission::Admin && !state.host.has_tag(&sender.id, ADMIN_TAG) {
        state.host.send_message(
            &sender.id,
            "§cYou don't have permission to run this command.",
        );
        return Ok(true);
    }

    if name == "help" {
        send_help(state, sender);
        return Ok(true);
    }
    if let Some(action) = name.strip_prefix("group:") {
        group_commands::handle(state, sender, action, &args).await?;
        return Ok(true);
    }
    if let Some(action) = name.strip_prefix("tpa:") {
        tpa_commands::handle(state, sender, action, args.first().copied().unwrap_or("")).await?;
        return Ok(true);
    }
    if let Some(action) = name.strip_prefix("score:") {
        score_commands::handle(state, sender, action);
        return Ok(true);
    }
    Ok(true)
}

/// Plain messages from a player in group chat mode are redirected to
/// their group instead of reaching global chat.
async fn route_plain_chat(
    state: &AppState,
    sender: &PlayerRef,
    message: &str,
) -> Result<bool, AppError> {
    let modes = state
        .store
        .load_chat_modes()
        .await
        .map_err(AppError::Internal)?;
    let mode = modes.get(&sender.name).copied().unwrap_or_default();
    if mode != ChatMode::Group {
        return Ok(false);
    }
    let groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    let Some((name, group)) = groups
        .iter()
        .find(|(_, group)| group.is_member(&sender.name))
    else {
        // Membership lapsed since the mode was stored; fall back to global.
        return Ok(false);
    };

    for member in &group.members {
        if let Some(player) = state.host.find_player(member) {
            state.host.send_message(
                &player.id,
                &format!("§9[{name}] §r{}: {message}", sender.name),
            );
        }
    }
    Ok(true)
}

fn send_help(state: &AppState, sender: &PlayerRef) {
    let is_admin = state.host.has_tag(&sender.id, ADMIN_TAG);
    let mut categories: Vec<(&str, Vec<&CommandSpec>)> = Vec::new();

    for spec in COMMANDS {
        if spec.permission == Permission::Admin && !is_admin {
            continue;
        }
        let category = spec.name.split_once(':').map(|(c, _)| c).unwrap_or("other");
        match categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, specs)) => specs.push(spec),
            None => categories.push((category, vec![spec])),
        }
    }

    for (category, specs) in categories {
        let title = if category == "other" {
            "Other Commands".to_string()
        } else {
            let mut chars = category.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            };
            format!("{capitalized} Commands")
        };
        state.host.send_message(&sender.id, &format!("§6{title}:"));
        for spec in specs {
            state.host.send_message(
                &sender.id,
                &format!("  - §a{PREFIX}{} §7- {}", spec.name, spec.description),
            );
        }
    }
}
