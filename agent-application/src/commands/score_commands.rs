use agent_domain::PlayerRef;

use crate::AppState;

const HIDE_TAG: &str = "hide-scoreboard";

pub fn handle(state: &AppState, sender: &PlayerRef, action: &str) {
    match action {
        "hide" => {
            state.host.add_tag(&sender.id, HIDE_TAG);
            state.host.clear_title(&sender.id);
            state.host.send_message(&sender.id, "§aScoreboard hidden!");
        }
        "show" => {
            state.host.remove_tag(&sender.id, HIDE_TAG);
            state.host.send_message(&sender.id, "§aScoreboard shown!");
        }
        _ => {
            state
                .host
                .send_message(&sender.id, &format!("§cUnknown score action \"{action}\"."));
        }
    }
}
