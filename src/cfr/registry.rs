//! InfoSet registry.
//!
//! The registry enumerates every reachable information set of a game once,
//! before solving starts, and resolves all the relations the solving phases
//! need into index form:
//!
//! - **Candidates**: the deals (joint private-type assignments) an InfoSet's
//!   owner cannot rule out, each with its prior and the chain of moves other
//!   players made in the public history while holding that deal.
//! - **Ancestors / descendants**: the InfoSets one public action before and
//!   after this one.
//! - **Outcomes**: for every legal action and every candidate, each way the
//!   game can continue through other players' moves until it either ends
//!   (payoff known) or comes back to the same player (their next InfoSet).
//!
//! Nodes are stored in increasing history-length order, which is the
//! topological order of the game: the utility pass walks it backwards, the
//! likelihood pass forwards.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::cfr::error::SolverError;
use crate::cfr::game::{Deal, Game, InfoSetKey, Symbol};

/// Tolerance on the total probability of a game's prior.
pub const PRIOR_TOLERANCE: f64 = 1e-9;

/// Typed index of an InfoSet in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoSetId(usize);

impl InfoSetId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One action taken at one InfoSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// InfoSet the action was taken from.
    pub info_set: InfoSetId,
    /// Index of the action in that InfoSet's action list.
    pub action: usize,
}

/// A deal consistent with an InfoSet, seen from its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<P> {
    /// Private types of all players, indexed by player slot.
    pub types: Vec<P>,
    /// Prior probability of the deal.
    pub prior: f64,
    /// Moves other players made in the public history, holding these types.
    pub chain: Vec<Move>,
}

/// Where a continuation after one of our actions stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf {
    /// The game ended; the deciding player's payoff.
    Payoff(f64),
    /// The deciding player acts again at this (deeper) InfoSet.
    InfoSet(InfoSetId),
}

/// One continuation of the game after an action, for one candidate deal.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Index into the InfoSet's candidates.
    pub candidate: usize,
    /// Moves by other players along the way.
    pub moves: Vec<Move>,
    /// Where the continuation stops.
    pub leaf: Leaf,
}

/// A decision point and its resolved relations.
#[derive(Debug, Clone)]
pub struct InfoSetNode<P, A> {
    /// Structured identity.
    pub key: InfoSetKey<P, A>,
    /// Textual identity, as used in persisted strategies.
    pub text: String,
    /// Deciding player.
    pub player: usize,
    /// Legal actions, in the order the game listed them.
    pub actions: Vec<A>,
    /// Deals the deciding player cannot rule out.
    pub candidates: Vec<Candidate<P>>,
    /// InfoSets that produced the last public action.
    pub ancestors: Vec<InfoSetId>,
    /// Per action: InfoSets of the next player to act.
    pub descendants: Vec<Vec<InfoSetId>>,
    /// Per action: all continuations over all candidates.
    pub outcomes: Vec<Vec<Outcome>>,
}

impl<P, A: PartialEq> InfoSetNode<P, A> {
    /// Length of the public history.
    pub fn depth(&self) -> usize {
        self.key.history.len()
    }

    /// Number of legal actions.
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Position of an action in this InfoSet's action list.
    pub fn action_index(&self, action: &A) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }
}

/// Every InfoSet of a game, with relations resolved.
#[derive(Debug, Clone)]
pub struct InfoSetRegistry<P, A> {
    nodes: Vec<InfoSetNode<P, A>>,
    index: FxHashMap<InfoSetKey<P, A>, InfoSetId>,
    text_index: FxHashMap<String, InfoSetId>,
    order: Vec<InfoSetId>,
    num_players: usize,
}

impl<P: Symbol, A: Symbol> InfoSetRegistry<P, A> {
    /// Enumerate and index every InfoSet of `game`.
    ///
    /// # Errors
    /// - `InvalidPrior` if the deal probabilities do not sum to one.
    /// - `InvalidHistory` if the game produces a malformed deal, an action outside
    ///   its alphabet, a non-terminal history without legal actions or longer than
    ///   `max_history_len`, or a payoff vector of the wrong length.
    pub fn build<G>(game: &G) -> Result<Self, SolverError>
    where
        G: Game<Private = P, Action = A>,
    {
        let num_players = game.num_players();
        let deals = validated_deals(game)?;
        let alphabet = game.action_alphabet();

        let mut nodes = Vec::new();
        let mut index = FxHashMap::default();
        let mut queue = VecDeque::from([Vec::new()]);

        while let Some(history) = queue.pop_front() {
            if game.is_terminal(&history) {
                continue;
            }
            if history.len() >= game.max_history_len() {
                return Err(SolverError::invalid_history(
                    game.history_text(&history),
                    format!(
                        "non-terminal history reaches the maximum length {}",
                        game.max_history_len()
                    ),
                ));
            }

            let player = game.deciding_player(history.len());
            if player >= num_players {
                return Err(SolverError::invalid_history(
                    game.history_text(&history),
                    format!("deciding player {} out of range", player),
                ));
            }

            let actions = game.legal_actions(&history);
            if actions.is_empty() {
                return Err(SolverError::invalid_history(
                    game.history_text(&history),
                    "no legal actions at a non-terminal history",
                ));
            }
            if let Some(action) = actions.iter().find(|a| !alphabet.contains(a)) {
                return Err(SolverError::invalid_history(
                    game.history_text(&history),
                    format!("action `{}` is outside the action alphabet", action.symbol()),
                ));
            }

            for private in game.private_types() {
                if !deals.iter().any(|d| d.types[player] == private) {
                    continue;
                }
                let key = InfoSetKey::new(private, history.clone());
                let id = InfoSetId(nodes.len());
                index.insert(key.clone(), id);
                nodes.push(InfoSetNode {
                    text: game.key_text(&key),
                    key,
                    player,
                    actions: actions.clone(),
                    candidates: Vec::new(),
                    ancestors: Vec::new(),
                    descendants: Vec::new(),
                    outcomes: Vec::new(),
                });
            }

            for action in actions {
                let mut next = history.clone();
                next.push(action);
                queue.push_back(next);
            }
        }

        let resolver = Resolver {
            game,
            nodes: &nodes,
            index: &index,
            deals: &deals,
        };
        let relations = nodes
            .iter()
            .map(|node| resolver.relations(node))
            .collect::<Result<Vec<_>, _>>()?;

        for (node, relations) in nodes.iter_mut().zip(relations) {
            node.candidates = relations.candidates;
            node.ancestors = relations.ancestors;
            node.descendants = relations.descendants;
            node.outcomes = relations.outcomes;
        }

        let text_index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.text.clone(), InfoSetId(i)))
            .collect();
        let order = (0..nodes.len()).map(InfoSetId).collect();

        Ok(Self {
            nodes,
            index,
            text_index,
            order,
            num_players,
        })
    }

    /// Number of InfoSets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the game has no decision points at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of players of the game.
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Get a node by id.
    pub fn node(&self, id: InfoSetId) -> &InfoSetNode<P, A> {
        &self.nodes[id.0]
    }

    /// All nodes, in topological order.
    pub fn nodes(&self) -> &[InfoSetNode<P, A>] {
        &self.nodes
    }

    /// Look up an InfoSet by its structured key.
    pub fn get(&self, key: &InfoSetKey<P, A>) -> Option<InfoSetId> {
        self.index.get(key).copied()
    }

    /// Look up an InfoSet by its textual key.
    pub fn get_by_text(&self, text: &str) -> Option<InfoSetId> {
        self.text_index.get(text).copied()
    }

    /// Ids in increasing history-length order.
    pub fn order(&self) -> &[InfoSetId] {
        &self.order
    }

    /// InfoSets with an empty public history.
    pub fn roots(&self) -> impl Iterator<Item = InfoSetId> + '_ {
        self.at_depth(0)
    }

    /// InfoSets whose public history has `depth` actions.
    pub fn at_depth(&self, depth: usize) -> impl Iterator<Item = InfoSetId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |id| self.nodes[id.0].depth() == depth)
    }

    /// Longest public history of any InfoSet.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(InfoSetNode::depth).max().unwrap_or(0)
    }
}

/// Check the prior and keep only deals that can happen.
fn validated_deals<G: Game>(game: &G) -> Result<Vec<Deal<G::Private>>, SolverError> {
    let alphabet = game.private_types();
    let deals = game.deals();
    let mut total = 0.0;

    for deal in &deals {
        let text = deal
            .types
            .iter()
            .map(Symbol::symbol)
            .collect::<Vec<_>>()
            .join(",");
        if deal.types.len() != game.num_players() {
            return Err(SolverError::invalid_history(
                text,
                format!(
                    "deal assigns {} private types for {} players",
                    deal.types.len(),
                    game.num_players()
                ),
            ));
        }
        if let Some(private) = deal.types.iter().find(|t| !alphabet.contains(t)) {
            return Err(SolverError::invalid_history(
                text,
                format!("private type `{}` is outside the alphabet", private.symbol()),
            ));
        }
        if !deal.probability.is_finite() || deal.probability < 0.0 {
            return Err(SolverError::InvalidPrior {
                total: deal.probability,
            });
        }
        total += deal.probability;
    }

    if (total - 1.0).abs() > PRIOR_TOLERANCE {
        return Err(SolverError::InvalidPrior { total });
    }

    Ok(deals.into_iter().filter(|d| d.probability > 0.0).collect())
}

struct Relations<P> {
    candidates: Vec<Candidate<P>>,
    ancestors: Vec<InfoSetId>,
    descendants: Vec<Vec<InfoSetId>>,
    outcomes: Vec<Vec<Outcome>>,
}

/// Resolves a node's relations against the enumerated arena.
struct Resolver<'a, G: Game> {
    game: &'a G,
    nodes: &'a [InfoSetNode<G::Private, G::Action>],
    index: &'a FxHashMap<InfoSetKey<G::Private, G::Action>, InfoSetId>,
    deals: &'a [Deal<G::Private>],
}

impl<G: Game> Resolver<'_, G> {
    fn relations(
        &self,
        node: &InfoSetNode<G::Private, G::Action>,
    ) -> Result<Relations<G::Private>, SolverError> {
        let candidates = self.candidates(node)?;
        let ancestors = self.ancestors(node, &candidates)?;

        let mut descendants = Vec::with_capacity(node.actions.len());
        let mut outcomes = Vec::with_capacity(node.actions.len());
        for &action in &node.actions {
            let mut history = node.key.history.clone();
            history.push(action);
            descendants.push(self.descendants(&history, &candidates)?);

            let mut found = Vec::new();
            let mut moves = Vec::new();
            for (i, candidate) in candidates.iter().enumerate() {
                self.walk(node, i, &candidate.types, &mut history, &mut moves, &mut found)?;
            }
            outcomes.push(found);
        }

        Ok(Relations {
            candidates,
            ancestors,
            descendants,
            outcomes,
        })
    }

    fn lookup(&self, private: G::Private, history: &[G::Action]) -> Result<InfoSetId, SolverError> {
        let key = InfoSetKey::new(private, history.to_vec());
        self.index.get(&key).copied().ok_or_else(|| {
            SolverError::invalid_history(self.game.key_text(&key), "info set was never enumerated")
        })
    }

    fn candidates(
        &self,
        node: &InfoSetNode<G::Private, G::Action>,
    ) -> Result<Vec<Candidate<G::Private>>, SolverError> {
        let history = &node.key.history;
        let mut candidates = Vec::new();

        for deal in self.deals {
            if deal.types[node.player] != node.key.private {
                continue;
            }
            let mut chain = Vec::new();
            for (j, action) in history.iter().enumerate() {
                let mover = self.game.deciding_player(j);
                if mover == node.player {
                    continue;
                }
                let info_set = self.lookup(deal.types[mover], &history[..j])?;
                let action = self.nodes[info_set.0].action_index(action).ok_or_else(|| {
                    SolverError::invalid_history(
                        self.game.history_text(&history[..=j]),
                        "action is not legal where it was taken",
                    )
                })?;
                chain.push(Move { info_set, action });
            }
            candidates.push(Candidate {
                types: deal.types.clone(),
                prior: deal.probability,
                chain,
            });
        }

        Ok(candidates)
    }

    fn ancestors(
        &self,
        node: &InfoSetNode<G::Private, G::Action>,
        candidates: &[Candidate<G::Private>],
    ) -> Result<Vec<InfoSetId>, SolverError> {
        let depth = node.depth();
        if depth == 0 {
            return Ok(Vec::new());
        }
        let prefix = &node.key.history[..depth - 1];
        let mover = self.game.deciding_player(depth - 1);
        if mover == node.player {
            return Ok(vec![self.lookup(node.key.private, prefix)?]);
        }

        let mut ancestors = Vec::new();
        for candidate in candidates {
            let id = self.lookup(candidate.types[mover], prefix)?;
            if !ancestors.contains(&id) {
                ancestors.push(id);
            }
        }
        Ok(ancestors)
    }

    fn descendants(
        &self,
        history: &[G::Action],
        candidates: &[Candidate<G::Private>],
    ) -> Result<Vec<InfoSetId>, SolverError> {
        if self.game.is_terminal(history) {
            return Ok(Vec::new());
        }
        let mover = self.game.deciding_player(history.len());
        let mut descendants = Vec::new();
        for candidate in candidates {
            let id = self.lookup(candidate.types[mover], history)?;
            if !descendants.contains(&id) {
                descendants.push(id);
            }
        }
        Ok(descendants)
    }

    /// Follow other players' moves until the game ends or returns to `node.player`.
    fn walk(
        &self,
        node: &InfoSetNode<G::Private, G::Action>,
        candidate: usize,
        types: &[G::Private],
        history: &mut Vec<G::Action>,
        moves: &mut Vec<Move>,
        found: &mut Vec<Outcome>,
    ) -> Result<(), SolverError> {
        if self.game.is_terminal(history) {
            let payoff = self.game.payoff(types, history)?;
            if payoff.len() != self.game.num_players() {
                return Err(SolverError::invalid_history(
                    self.game.history_text(history),
                    format!("payoff vector has {} entries", payoff.len()),
                ));
            }
            found.push(Outcome {
                candidate,
                moves: moves.clone(),
                leaf: Leaf::Payoff(payoff[node.player]),
            });
            return Ok(());
        }

        let mover = self.game.deciding_player(history.len());
        if mover == node.player {
            found.push(Outcome {
                candidate,
                moves: moves.clone(),
                leaf: Leaf::InfoSet(self.lookup(node.key.private, history)?),
            });
            return Ok(());
        }

        let info_set = self.lookup(types[mover], history)?;
        for (action, &symbol) in self.nodes[info_set.0].actions.iter().enumerate() {
            history.push(symbol);
            moves.push(Move { info_set, action });
            self.walk(node, candidate, types, history, moves, found)?;
            moves.pop();
            history.pop();
        }
        Ok(())
    }
}
