use agent_domain::{ChatMode, GroupData};
use agent_domain::PlayerRef;

use crate::{AppError, AppState};

pub async fn handle(
    state: &AppState,
    sender: &PlayerRef,
    action: &str,
    args: &[&str],
) -> Result<(), AppError> {
    match action {
        "create" => create_group(state, sender, args.first().copied().unwrap_or("")).await,
        "join" => join_group(state, sender, args.first().copied().unwrap_or("")).await,
        "leave" => leave_group(state, sender, args.first().copied().unwrap_or("")).await,
        "accept" => accept_request(state, sender, args.first().copied().unwrap_or("")).await,
        "pending" => show_pending(state, sender).await,
        "chatmode" => set_chat_mode(state, sender, args.first().copied().unwrap_or("")).await,
        "chat" => send_group_chat(state, sender, &args.join(" ")).await,
        _ => {
            state
                .host
                .send_message(&sender.id, &format!("§cUnknown group action \"{action}\"."));
            Ok(())
        }
    }
}

async fn create_group(state: &AppState, sender: &PlayerRef, name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !group:create <groupName>");
        return Ok(());
    }
    let mut groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    if groups.contains_key(name) {
        state
            .host
            .send_message(&sender.id, &format!("§cGroup \"{name}\" already exists."));
        return Ok(());
    }
    if groups.values().any(|group| group.owner == sender.name) {
        state
            .host
            .send_message(&sender.id, "§cYou already own a group.");
        return Ok(());
    }

    groups.insert(name.to_string(), GroupData::new(name, sender.name.clone()));
    state
        .store
        .save_groups(&groups)
        .await
        .map_err(AppError::Internal)?;
    state
        .host
        .send_message(&sender.id, &format!("§aGroup \"{name}\" created."));
    Ok(())
}

async fn join_group(state: &AppState, sender: &PlayerRef, name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !group:join <groupName>");
        return Ok(());
    }
    let mut groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    let Some(group) = groups.get_mut(name) else {
        state
            .host
            .send_message(&sender.id, &format!("§cGroup \"{name}\" not found."));
        return Ok(());
    };
    if group.is_member(&sender.name) {
        state
            .host
            .send_message(&sender.id, "§cYou are already a member of this group.");
        return Ok(());
    }
    if group.is_pending(&sender.name) {
        state
            .host
            .send_message(&sender.id, "§cYou have already requested to join this group.");
        return Ok(());
    }

    group.pending.push(sender.name.clone());
    let owner = group.owner.clone();
    state
        .store
        .save_groups(&groups)
        .await
        .map_err(AppError::Internal)?;
    state
        .host
        .send_message(&sender.id, &format!("§aJoin request sent to group \"{name}\"."));
    if let Some(owner) = state.host.find_player(&owner) {
        state.host.send_message(
            &owner.id,
            &format!(
                "§e{} has requested to join group \"{name}\". §7Use !group:accept {} to accept the request.",
                sender.name, sender.name
            ),
        );
    }
    Ok(())
}

async fn leave_group(state: &AppState, sender: &PlayerRef, name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !group:leave <groupName>");
        return Ok(());
    }
    let mut groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    let Some(group) = groups.get_mut(name) else {
        state
            .host
            .send_message(&sender.id, &format!("§cGroup \"{name}\" not found."));
        return Ok(());
    };
    if !group.is_member(&sender.name) {
        state
            .host
            .send_message(&sender.id, "§cYou are not a member of this group.");
        return Ok(());
    }

    // Owner leaving disbands the whole group.
    if group.owner == sender.name {
        let members = group.members.clone();
        groups.remove(name);
        state
            .store
            .save_groups(&groups)
            .await
            .map_err(AppError::Internal)?;
        for member in members {
            if let Some(player) = state.host.find_player(&member) {
                state.host.send_message(
                    &player.id,
                    &format!("§eGroup \"{name}\" has been disbanded by its owner."),
                );
            }
        }
        return Ok(());
    }

    group.members.retain(|member| member != &sender.name);
    state
        .store
        .save_groups(&groups)
        .await
        .map_err(AppError::Internal)?;
    state
        .host
        .send_message(&sender.id, &format!("§aYou left group \"{name}\"."));
    Ok(())
}

async fn accept_request(state: &AppState, sender: &PlayerRef, arg: &str) -> Result<(), AppError> {
    let mut groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    let Some((name, group)) = groups
        .iter_mut()
        .find(|(_, group)| group.owner == sender.name)
    else {
        state
            .host
            .send_message(&sender.id, "§cYou don't own any group.");
        return Ok(());
    };
    let name = name.clone();

    if group.pending.is_empty() {
        state
            .host
            .send_message(&sender.id, "§cNo pending join requests.");
        return Ok(());
    }

    if arg.eq_ignore_ascii_case("all") {
        let accepted = std::mem::take(&mut group.pending);
        group.members.extend(accepted.iter().cloned());
        let count = accepted.len();
        state
            .store
            .save_groups(&groups)
            .await
            .map_err(AppError::Internal)?;
        for player_name in accepted {
            if let Some(player) = state.host.find_player(&player_name) {
                state.host.send_message(
                    &player.id,
                    &format!("§aYou have been accepted into group \"{name}\"."),
                );
            }
        }
        state
            .host
            .send_message(&sender.id, &format!("§aAccepted all {count} join requests."));
        return Ok(());
    }

    let Some(index) = group
        .pending
        .iter()
        .position(|pending| pending.eq_ignore_ascii_case(arg))
    else {
        state
            .host
            .send_message(&sender.id, &format!("§cNo pending request from \"{arg}\"."));
        return Ok(());
    };
    let accepted = group.pending.remove(index);
    group.members.push(accepted.clone());
    state
        .store
        .save_groups(&groups)
        .await
        .map_err(AppError::Internal)?;
    if let Some(player) = state.host.find_player(&accepted) {
        state.host.send_message(
            &player.id,
            &format!("§aYou have been accepted into group \"{name}\"."),
        );
    }
    state
        .host
        .send_message(&sender.id, &format!("§aAccepted {accepted} into \"{name}\"."));
    Ok(())
}

async fn show_pending(state: &AppState, sender: &PlayerRef) -> Result<(), AppError> {
    let groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    let Some((name, group)) = groups.iter().find(|(_, group)| group.owner == sender.name) else {
        state
            .host
            .send_message(&sender.id, "§cYou don't own any group.");
        return Ok(());
    };

    if group.pending.is_empty() {
        state
            .host
            .send_message(&sender.id, "§eNo pending join requests.");
        return Ok(());
    }
    state.host.send_message(
        &sender.id,
        &format!(
            "§6Pending requests for \"{name}\":\n§7{}\n§eUse !group:accept <playerName> to accept individual requests or !group:accept all to accept all requests.",
            group.pending.join(", ")
        ),
    );
    Ok(())
}

async fn set_chat_mode(state: &AppState, sender: &PlayerRef, mode: &str) -> Result<(), AppError> {
    let mode = match mode.to_lowercase().as_str() {
        "global" => ChatMode::Global,
        "group" => ChatMode::Group,
        _ => {
            state
                .host
                .send_message(&sender.id, "§cInvalid chat mode. Use 'global' or 'group'.");
            return Ok(());
        }
    };

    if mode == ChatMode::Group {
        let groups = state.store.load_groups().await.map_err(AppError::Internal)?;
        let in_group = groups.values().any(|group| group.is_member(&sender.name));
        if !in_group {
            state
                .host
                .send_message(&sender.id, "§cYou are not a member of any group.");
            return Ok(());
        }
    }

    let mut modes = state
        .store
        .load_chat_modes()
        .await
        .map_err(AppError::Internal)?;
    modes.insert(sender.name.clone(), mode);
    state
        .store
        .save_chat_modes(&modes)
        .await
        .map_err(AppError::Internal)?;
    let label = match mode {
        ChatMode::Global => "global",
        ChatMode::Group => "group",
    };
    state.host.send_message(
        &sender.id,
        &format!("§aYour chat mode has been set to \"{label}\"."),
    );
    Ok(())
}

async fn send_group_chat(state: &AppState, sender: &PlayerRef, message: &str) -> Result<(), AppError> {
    if message.trim().is_empty() {
        state
            .host
            .send_message(&sender.id, "§cUsage: !group:chat <message>");
        return Ok(());
    }
    let groups = state.store.load_groups().await.map_err(AppError::Internal)?;
    let Some((name, group)) = groups
        .iter()
        .find(|(_, group)| group.is_member(&sender.name))
    else {
        state
            .host
            .send_message(&sender.id, "§cYou are not a member of any group.");
        return Ok(());
    };

    for member in &group.members {
        if let Some(player) = state.host.find_player(member) {
            state.host.send_message(
                &player.id,
                &format!("§9[{name}] §r{}: {message}", sender.name),
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_world;

    #[tokio::test]
    async fn create_join_accept_makes_a_member() {
        let world = test_world();
        let alice = PlayerRef::new("p1", "Alice");
        let bob = PlayerRef::new("p2", "Bob");
        world.host.join(alice.clone());
        world.host.join(bob.clone());

        handle(&world.state, &alice, "create", &["miners"]).await.unwrap();
        handle(&world.state, &bob, "join", &["miners"]).await.unwrap();

        let groups = world.store.groups();
        assert!(groups["miners"].is_pending("Bob"));
        assert!(!groups["miners"].is_member("Bob"));

        handle(&world.state, &alice, "accept", &["Bob"]).await.unwrap();

        let groups = world.store.groups();
        assert!(groups["miners"].is_member("Bob"));
        assert!(!groups["miners"].is_pending("Bob"));
        assert!(world
            .host
            .messages_for(&bob.id)
            .iter()
            .any(|message| message.contains("accepted into group")));
    }

    #[tokio::test]
    async fn one_owned_group_per_player() {
        let world = test_world();
        let alice = PlayerRef::new("p1", "Alice");
        world.host.join(alice.clone());

        handle(&world.state, &alice, "create", &["miners"]).await.unwrap();
        handle(&world.state, &alice, "create", &["diggers"]).await.unwrap();

        let groups = world.store.groups();
        assert_eq!(groups.len(), 1);
        assert!(world
            .host
            .messages_for(&alice.id)
            .iter()
            .any(|message| message.contains("already own a group")));
    }

    #[tokio::test]
    async fn accept_all_drains_every_pending_request() {
        let world = test_world();
        let alice = PlayerRef::new("p1", "Alice");
        world.host.join(alice.clone());
        let mut group = GroupData::new("miners", "Alice");
        group.pending = vec!["Bob".into(), "Carol".into()];
        world.store.put_group(group);

        handle(&world.state, &alice, "accept", &["all"]).await.unwrap();

        let groups = world.store.groups();
        assert!(groups["miners"].pending.is_empty());
        assert!(groups["miners"].is_member("Bob"));
        assert!(groups["miners"].is_member("Carol"));
    }

    #[tokio::test]
    async fn owner_leaving_disbands_the_group() {
        let world = test_world();
        let alice = PlayerRef::new("p1", "Alice");
        let bob = PlayerRef::new("p2", "Bob");
        world.host.join(alice.clone());
        world.host.join(bob.clone());
        let mut group = GroupData::new("miners", "Alice");
        group.members.push("Bob".into());
        world.store.put_group(group);

        handle(&world.state, &alice, "leave", &["miners"]).await.unwrap();

        assert!(world.store.groups().is_empty());
        assert!(world
            .host
            .messages_for(&bob.id)
            .iter()
            .any(|message| message.contains("disbanded")));
    }

    #[tokio::test]
    async fn member_leaving_keeps_the_group() {
        let world = test_world();
        let bob = PlayerRef::new("p2", "Bob");
        world.host.join(bob.clone());
        let mut group = GroupData::new("miners", "Alice");
        group.members.push("Bob".into());
        world.store.put_group(group);

        handle(&world.state, &bob, "leave", &["miners"]).await.unwrap();

        let groups = world.store.groups();
        assert!(!groups["miners"].is_member("Bob"));
        assert!(groups["miners"].is_member("Alice"));
    }

    #[tokio::test]
    async fn group_chat_mode_requires_membership() {
        let world = test_world();
        let bob = PlayerRef::new("p2", "Bob");
        world.host.join(bob.clone());

        handle(&world.state, &bob, "chatmode", &["group"]).await.unwrap();

        assert!(world
            .host
            .messages_for(&bob.id)
            .iter()
            .any(|message| message.contains("not a member of any group")));
    }

    #[tokio::test]
    async fn group_chat_reaches_online_members_only() {
        let world = test_world();
        let alice = PlayerRef::new("p1", "Alice");
        let bob = PlayerRef::new("p2", "Bob");
        world.host.join(alice.clone());
        world.host.join(bob.clone());
        let mut group = GroupData::new("miners", "Alice");
        group.members.push("Bob".into());
        group.members.push("Offline".into());
        world.store.put_group(group);

        handle(&world.state, &alice, "chat", &["ore", "found"]).await.unwrap();

        let expected = "§9[miners] §rAlice: ore found".to_string();
        assert!(world.host.messages_for(&alice.id).contains(&expected));
        assert!(world.host.messages_for(&bob.id).contains(&expected));
    }
}
