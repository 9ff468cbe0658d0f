use rand::Rng;
use rand_xorshift::XorShiftRng;
use std::sync::Mutex;
use std::time::Instant;

use super::{lock_rng, playout, seeded_rng, DecisionStrategy};
use crate::rules::RulesEngine;

const MCTS_SIMULATIONS: usize = 100;
const EXPLORATION_CONSTANT: f64 = 1.41; // sqrt(2)

/// Node in the MCTS tree
struct MctsNode<S, A> {
    state: S,
    actions: Vec<A>,
    position: Option<usize>, // Index into the parent's `actions` (None for root)
    mover: Option<usize>,    // Seat that chose the action leading here
    parent: Option<usize>,
    children: Vec<usize>,
    visits: usize,
    wins: usize,
    untried: Vec<usize>, // Positions in `actions` not yet expanded
    terminal: bool,
}

impl<S, A> MctsNode<S, A> {
    fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    fn uct_value(&self, parent_visits: usize, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }

        let exploitation = self.wins as f64 / self.visits as f64;
        let exploration_term =
            exploration * ((parent_visits as f64).ln() / self.visits as f64).sqrt();

        exploitation + exploration_term
    }
}

/// Monte Carlo Tree Search strategy
/// Builds a UCT tree rooted at the current state and picks the most visited child.
pub struct MctsStrategy {
    num_simulations: usize,
    exploration_constant: f64,
    rng: Mutex<XorShiftRng>,
}

impl MctsStrategy {
    pub fn new() -> Self {
        Self::with_seed(None)
    }

    pub fn with_seed(seed: Option<u64>) -> Self {
        MctsStrategy {
            num_simulations: MCTS_SIMULATIONS,
            exploration_constant: EXPLORATION_CONSTANT,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    pub fn with_parameters(
        num_simulations: usize,
        exploration_constant: f64,
        seed: Option<u64>,
    ) -> Self {
        MctsStrategy {
            num_simulations,
            exploration_constant,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    fn make_node<E: RulesEngine>(
        engine: &E,
        state: E::State,
        actions: Vec<E::Action>,
        position: Option<usize>,
        mover: Option<usize>,
        parent: Option<usize>,
    ) -> MctsNode<E::State, E::Action> {
        let terminal = engine.winner(&state).is_some() || actions.is_empty();
        MctsNode {
            untried: (0..actions.len()).collect(),
            state,
            actions,
            position,
            mover,
            parent,
            children: Vec::new(),
            visits: 0,
            wins: 0,
            terminal,
        }
    }

    /// Selects a node for expansion using UCT
    fn select_node<S, A>(&self, nodes: &[MctsNode<S, A>], mut node_index: usize) -> usize {
        loop {
            let current = &nodes[node_index];
            if !current.is_fully_expanded() || current.terminal || current.children.is_empty() {
                return node_index;
            }

            let parent_visits = current.visits;
            let mut best_child_index = current.children[0];
            let mut best_value = f64::NEG_INFINITY;
            for &child_index in &current.children {
                let value = nodes[child_index].uct_value(parent_visits, self.exploration_constant);
                if value > best_value {
                    best_value = value;
                    best_child_index = child_index;
                }
            }
            node_index = best_child_index;
        }
    }

    /// Expand the node by adding a new child node for an untried action
    fn expand<E: RulesEngine>(
        &self,
        engine: &E,
        nodes: &mut Vec<MctsNode<E::State, E::Action>>,
        node_index: usize,
        rng: &mut XorShiftRng,
    ) -> usize {
        let (position, child_state, mover) = {
            let node = &mut nodes[node_index];
            if node.untried.is_empty() {
                return node_index;
            }

            let pick = rng.gen_range(0..node.untried.len());
            let position = node.untried.swap_remove(pick);

            let mut child_state = node.state.clone();
            if engine.apply(&mut child_state, &node.actions[position]).is_err() {
                return node_index;
            }
            (position, child_state, engine.current_seat_index(&node.state))
        };

        let actions = engine.legal_actions(&child_state);
        let child = Self::make_node(
            engine,
            child_state,
            actions,
            Some(position),
            Some(mover),
            Some(node_index),
        );
        let child_index = nodes.len();
        nodes.push(child);
        nodes[node_index].children.push(child_index);
        child_index
    }

    /// Backpropagate the result up the tree
    fn backpropagate<S, A>(nodes: &mut [MctsNode<S, A>], node_index: usize, winner: Option<usize>) {
        let mut current_index = Some(node_index);
        while let Some(index) = current_index {
            let node = &mut nodes[index];
            node.visits += 1;
            if winner.is_some() && winner == node.mover {
                node.wins += 1;
            }
            current_index = node.parent;
        }
    }
}

impl Default for MctsStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> DecisionStrategy<E> for MctsStrategy {
    fn name(&self) -> &str {
        "mcts"
    }

    fn decide(&self, engine: &E, state: &E::State, legal_actions: &[E::Action]) -> Option<usize> {
        if legal_actions.len() == 1 {
            return Some(0);
        }

        let start = Instant::now();
        let mut rng = lock_rng(&self.rng);

        // Root children are keyed by position in the caller's listing
        let mut nodes = vec![Self::make_node(
            engine,
            state.clone(),
            legal_actions.to_vec(),
            None,
            None,
            None,
        )];

        for _ in 0..self.num_simulations {
            let selected = self.select_node(&nodes, 0);
            let leaf = if nodes[selected].terminal {
                selected
            } else {
                self.expand(engine, &mut nodes, selected, &mut rng)
            };
            let winner = playout(engine, nodes[leaf].state.clone(), &mut *rng);
            Self::backpropagate(&mut nodes, leaf, winner);
        }

        let best = nodes[0]
            .children
            .iter()
            .map(|&child_index| &nodes[child_index])
            .filter(|child| child.visits > 0)
            .max_by_key(|child| child.visits)
            .and_then(|child| child.position);

        log::debug!(
            "MCTS took {:?} to make a decision with {} simulations over {} actions",
            start.elapsed(),
            self.num_simulations,
            legal_actions.len()
        );

        best
    }
}
