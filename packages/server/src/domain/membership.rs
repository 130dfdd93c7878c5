//! Room Membership Index.
//!
//! Maps each room to the connections currently present in it, plus a reverse
//! index from connection to room so that leave and disconnect cleanup are
//! O(1) instead of a scan over all rooms.
//!
//! ```text
//! members:   room1 ─┬─ sock-a (alice)      locations:  sock-a → room1
//!                   └─ sock-b (bob)                    sock-b → room1
//!            room2 ─── sock-c (carol)                  sock-c → room2
//! ```
//!
//! A connection is in at most one room: joining another room moves it.
//! Both maps are sharded, so mutations only contend within a shard and there
//! is no lock across all rooms.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;

use super::{
    ChatRoom, ConnectionId, MembershipEntry, MembershipError, RoomId, RoomRepository, UserId,
};

#[derive(Debug, Clone)]
struct Member {
    user_id: UserId,
    /// Join order, used to give snapshots a stable ordering
    seq: u64,
}

/// Result of a successful join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    /// Canonical record of the joined room
    pub room: ChatRoom,
    /// The room the connection was moved out of, with its entry there
    pub previous: Option<(RoomId, MembershipEntry)>,
}

pub struct RoomMembershipIndex {
    rooms: Arc<dyn RoomRepository>,
    members: DashMap<RoomId, HashMap<ConnectionId, Member>>,
    locations: DashMap<ConnectionId, RoomId>,
    next_seq: AtomicU64,
}

impl RoomMembershipIndex {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self {
            rooms,
            members: DashMap::new(),
            locations: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Add `entry` to `room_id` after checking that the room exists.
    ///
    /// Joining a room the connection is already in replaces its entry. If the
    /// connection was in another room it is removed from there, and that room
    /// is reported in [`Joined::previous`].
    ///
    /// # Errors
    ///
    /// `RoomNotFound` when the room does not exist, `Lookup` when the room
    /// store fails. The index is left untouched in both cases.
    pub async fn join(
        &self,
        room_id: &RoomId,
        entry: MembershipEntry,
    ) -> Result<Joined, MembershipError> {
        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or_else(|| MembershipError::RoomNotFound(room_id.to_string()))?;

        let MembershipEntry {
            connection_id,
            user_id,
        } = entry;

        {
            let mut bucket = self.members.entry(room_id.clone()).or_default();
            match bucket.get_mut(&connection_id) {
                Some(member) => member.user_id = user_id,
                None => {
                    let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                    bucket.insert(connection_id.clone(), Member { user_id, seq });
                }
            }
        }

        let previous = self
            .locations
            .insert(connection_id.clone(), room_id.clone())
            .filter(|previous_room| previous_room != room_id)
            .and_then(|previous_room| {
                self.remove_from_bucket(&previous_room, &connection_id)
                    .map(|entry| (previous_room, entry))
            });

        Ok(Joined { room, previous })
    }

    /// Remove `connection_id` from `room_id`. Returns the removed entry, or
    /// `None` if the connection was not in that room.
    pub fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<MembershipEntry> {
        let removed = self.remove_from_bucket(room_id, connection_id);
        self.locations
            .remove_if(connection_id, |_, current| current == room_id);
        removed
    }

    /// Current members of `room_id` in join order; empty if the room is unknown.
    pub fn members_of(&self, room_id: &RoomId) -> Vec<MembershipEntry> {
        let Some(bucket) = self.members.get(room_id) else {
            return Vec::new();
        };
        let mut members: Vec<_> = bucket
            .iter()
            .map(|(connection_id, member)| (member.seq, connection_id, &member.user_id))
            .collect();
        members.sort_by_key(|(seq, _, _)| *seq);
        members
            .into_iter()
            .map(|(_, connection_id, user_id)| {
                MembershipEntry::new(connection_id.clone(), user_id.clone())
            })
            .collect()
    }

    /// Which room currently contains `connection_id`, with its members.
    pub fn locate(&self, connection_id: &ConnectionId) -> Option<(RoomId, Vec<MembershipEntry>)> {
        let room_id = self.locations.get(connection_id)?.value().clone();
        let members = self.members_of(&room_id);
        Some((room_id, members))
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.members.get(room_id).map_or(0, |bucket| bucket.len())
    }

    fn remove_from_bucket(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<MembershipEntry> {
        let mut bucket = self.members.get_mut(room_id)?;
        bucket
            .remove(connection_id)
            .map(|member| MembershipEntry::new(connection_id.clone(), member.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockRoomRepository, RepositoryError, Timestamp};

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn entry(connection: &str, user: &str) -> MembershipEntry {
        MembershipEntry::new(
            ConnectionId::new(connection.to_string()).unwrap(),
            UserId::new(user.to_string()).unwrap(),
        )
    }

    /// Index whose room store knows exactly `known` rooms
    fn create_index(known: &'static [&'static str]) -> RoomMembershipIndex {
        let mut rooms = MockRoomRepository::new();
        rooms.expect_find_room().returning(move |id| {
            Ok(known.iter().any(|k| *k == id.as_str()).then(|| {
                ChatRoom::new(id.clone(), format!("{id} room"), Timestamp::new(0))
            }))
        });
        RoomMembershipIndex::new(Arc::new(rooms))
    }

    #[tokio::test]
    async fn test_join_then_locate() {
        // テスト項目: join 後の locate はそのルームを返す
        // given (前提条件):
        let index = create_index(&["room1"]);

        // when (操作):
        let joined = index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(joined.room.id, room_id("room1"));
        assert!(joined.previous.is_none());
        let (located, members) = index.locate(&entry("a", "alice").connection_id).unwrap();
        assert_eq!(located, room_id("room1"));
        assert_eq!(members, vec![entry("a", "alice")]);
    }

    #[tokio::test]
    async fn test_leave_then_locate_not_found() {
        // テスト項目: leave 後の locate は見つからない
        // given (前提条件):
        let index = create_index(&["room1"]);
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();

        // when (操作):
        let removed = index.leave(&room_id("room1"), &entry("a", "alice").connection_id);

        // then (期待する結果):
        assert_eq!(removed, Some(entry("a", "alice")));
        assert!(index.locate(&entry("a", "alice").connection_id).is_none());
        assert!(index.members_of(&room_id("room1")).is_empty());
    }

    #[tokio::test]
    async fn test_join_twice_yields_one_entry() {
        // テスト項目: 同じ接続で二度 join してもエントリは一つ
        // given (前提条件):
        let index = create_index(&["room1"]);

        // when (操作):
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(index.members_of(&room_id("room1")), vec![entry("a", "alice")]);
        assert_eq!(index.member_count(&room_id("room1")), 1);
    }

    #[tokio::test]
    async fn test_rejoin_replaces_user_but_keeps_position() {
        // テスト項目: 再 join はエントリを置き換え、並び順は維持される
        // given (前提条件):
        let index = create_index(&["room1"]);
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();
        index.join(&room_id("room1"), entry("b", "bob")).await.unwrap();

        // when (操作):
        index.join(&room_id("room1"), entry("a", "alice2")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            index.members_of(&room_id("room1")),
            vec![entry("a", "alice2"), entry("b", "bob")]
        );
    }

    #[tokio::test]
    async fn test_join_unknown_room_does_not_mutate() {
        // テスト項目: 存在しないルームへの join はインデックスを変更しない
        // given (前提条件):
        let index = create_index(&["room1"]);
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();

        // when (操作):
        let result = index.join(&room_id("nowhere"), entry("a", "alice")).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            MembershipError::RoomNotFound("nowhere".to_string())
        );
        assert_eq!(index.locate(&entry("a", "alice").connection_id).unwrap().0, room_id("room1"));
        assert!(index.members_of(&room_id("nowhere")).is_empty());
    }

    #[tokio::test]
    async fn test_join_other_room_moves_connection() {
        // テスト項目: 別ルームへの join は前のルームから接続を移動する
        // given (前提条件):
        let index = create_index(&["room1", "room2"]);
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();
        index.join(&room_id("room1"), entry("b", "bob")).await.unwrap();

        // when (操作):
        let joined = index.join(&room_id("room2"), entry("a", "alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(joined.previous, Some((room_id("room1"), entry("a", "alice"))));
        assert_eq!(index.members_of(&room_id("room1")), vec![entry("b", "bob")]);
        assert_eq!(index.members_of(&room_id("room2")), vec![entry("a", "alice")]);
        assert_eq!(index.locate(&entry("a", "alice").connection_id).unwrap().0, room_id("room2"));
    }

    #[tokio::test]
    async fn test_leave_wrong_room_keeps_location() {
        // テスト項目: 所属していないルームからの leave は何もしない
        // given (前提条件):
        let index = create_index(&["room1", "room2"]);
        index.join(&room_id("room1"), entry("a", "alice")).await.unwrap();

        // when (操作):
        let removed = index.leave(&room_id("room2"), &entry("a", "alice").connection_id);

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(index.locate(&entry("a", "alice").connection_id).unwrap().0, room_id("room1"));
    }

    #[tokio::test]
    async fn test_join_lookup_failure() {
        // テスト項目: ルーム検索の失敗は Lookup エラーになる
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_find_room()
            .returning(|_| Err(RepositoryError::Unavailable("db down".to_string())));
        let index = RoomMembershipIndex::new(Arc::new(rooms));

        // when (操作):
        let result = index.join(&room_id("room1"), entry("a", "alice")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MembershipError::Lookup(_))));
        assert!(index.locate(&entry("a", "alice").connection_id).is_none());
    }

    #[test]
    fn test_members_of_unknown_room_is_empty() {
        // テスト項目: 未知のルームのメンバーは空
        // given (前提条件):
        let index = create_index(&[]);

        // then (期待する結果):
        assert!(index.members_of(&room_id("room1")).is_empty());
        assert_eq!(index.member_count(&room_id("room1")), 0);
    }
}
