//! Neo4j implementation of [`GraphStore`] on top of `neo4rs`.
//!
//! Every [`WriteOp`] compiles to one `UNWIND $rows AS row ...` statement, and
//! a [`WriteBatch`] runs inside a single explicit transaction.

use super::error::GraphError;
use super::models::{
    Album, AlbumKey, Artist, ArtistStatistics, ArtistSummary, Collaboration, DeleteTarget,
    GenreStatistics, GraphCounts, PropertyValue, TrackDetails, TrackFilter, TrackNode,
    TrackQuery, TrackSummary, VersatileArtist,
};
use super::ops::{BatchReport, OpReport, WriteBatch, WriteOp};
use super::schema::{SchemaOutcome, SchemaStatement};
use super::trait_def::{GraphStore, COLLABORATION_SAMPLES, SUMMARY_ARTISTS};
use super::update::TrackUpdate;
use async_trait::async_trait;
use neo4rs::{query, BoltNull, BoltType, ConfigBuilder, Graph, Query, Row, Txn};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Connection parameters of the graph service.
#[derive(Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl fmt::Debug for Neo4jConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Maps a driver error to the pipeline's error classes.
fn classify(err: neo4rs::Error) -> GraphError {
    match err {
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
            GraphError::Connectivity(err.to_string())
        }
        neo4rs::Error::AuthenticationError(message) => GraphError::Authentication(message),
        other => GraphError::from_status_message(other.to_string()),
    }
}

fn decode<E: fmt::Display>(err: E) -> GraphError {
    GraphError::Query(format!("unexpected result shape: {}", err))
}

fn bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::Bool(b) => (*b).into(),
        PropertyValue::Int(i) => (*i).into(),
        PropertyValue::Float(f) => (*f).into(),
        PropertyValue::Text(s) => s.clone().into(),
    }
}

fn optional<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    match value {
        Some(v) => v.into(),
        None => BoltType::Null(BoltNull),
    }
}

type BoltRow = HashMap<String, BoltType>;

fn row<const N: usize>(pairs: [(&str, BoltType); N]) -> BoltRow {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn album_row(key: &AlbumKey) -> [(&'static str, BoltType); 2] {
    [
        ("album", key.name.clone().into()),
        ("album_artist", key.artist.clone().into()),
    ]
}

/// Cypher text and unwound rows for one statement.
fn compile(op: &WriteOp) -> (&'static str, Vec<BoltRow>) {
    match op {
        WriteOp::UpsertTracks(tracks) => (
            "UNWIND $rows AS row \
             MERGE (t:Track {track_id: row.track_id}) \
             SET t = row \
             RETURN count(*) AS applied",
            tracks
                .iter()
                .map(|t| {
                    t.properties()
                        .iter()
                        .map(|(k, v)| (k.to_string(), bolt(v)))
                        .collect()
                })
                .collect(),
        ),
        WriteOp::MergeArtists(names) => (
            "UNWIND $rows AS row \
             MERGE (a:Artist {name: row.name}) \
             RETURN count(*) AS applied",
            names
                .iter()
                .map(|n| row([("name", n.clone().into())]))
                .collect(),
        ),
        WriteOp::MergeAlbums(keys) => (
            "UNWIND $rows AS row \
             MERGE (al:Album {name: row.album, artist: row.album_artist}) \
             RETURN count(*) AS applied",
            keys.iter().map(|k| row(album_row(k))).collect(),
        ),
        WriteOp::MergeGenres(names) => (
            "UNWIND $rows AS row \
             MERGE (g:Genre {name: row.name}) \
             RETURN count(*) AS applied",
            names
                .iter()
                .map(|n| row([("name", n.clone().into())]))
                .collect(),
        ),
        WriteOp::MergePerforms(edges) => (
            "UNWIND $rows AS row \
             MATCH (a:Artist {name: row.artist}) \
             MATCH (t:Track {track_id: row.track_id}) \
             MERGE (a)-[:PERFORMS]->(t) \
             RETURN count(*) AS applied",
            edges
                .iter()
                .map(|e| {
                    row([
                        ("artist", e.artist.clone().into()),
                        ("track_id", e.track_id.clone().into()),
                    ])
                })
                .collect(),
        ),
        WriteOp::MergeBelongsTo(edges) => (
            "UNWIND $rows AS row \
             MATCH (t:Track {track_id: row.track_id}) \
             MATCH (al:Album {name: row.album, artist: row.album_artist}) \
             MERGE (t)-[:BELONGS_TO]->(al) \
             RETURN count(*) AS applied",
            edges
                .iter()
                .map(|e| {
                    let [album, album_artist] = album_row(&e.album);
                    row([("track_id", e.track_id.clone().into()), album, album_artist])
                })
                .collect(),
        ),
        WriteOp::MergeHasGenre(edges) => (
            "UNWIND $rows AS row \
             MATCH (t:Track {track_id: row.track_id}) \
             MATCH (g:Genre {name: row.genre}) \
             MERGE (t)-[:HAS_GENRE]->(g) \
             RETURN count(*) AS applied",
            edges
                .iter()
                .map(|e| {
                    row([
                        ("track_id", e.track_id.clone().into()),
                        ("genre", e.genre.clone().into()),
                    ])
                })
                .collect(),
        ),
        WriteOp::MergePlaysGenre(edges) => (
            "UNWIND $rows AS row \
             MATCH (a:Artist {name: row.artist}) \
             MATCH (g:Genre {name: row.genre}) \
             MERGE (a)-[:PLAYS_GENRE]->(g) \
             RETURN count(*) AS applied",
            edges
                .iter()
                .map(|e| {
                    row([
                        ("artist", e.artist.clone().into()),
                        ("genre", e.genre.clone().into()),
                    ])
                })
                .collect(),
        ),
        WriteOp::MergeCreated(edges) => (
            "UNWIND $rows AS row \
             MATCH (a:Artist {name: row.artist}) \
             MATCH (al:Album {name: row.album, artist: row.album_artist}) \
             MERGE (a)-[:CREATED]->(al) \
             RETURN count(*) AS applied",
            edges
                .iter()
                .map(|e| {
                    let [album, album_artist] = album_row(&e.album);
                    row([("artist", e.artist.clone().into()), album, album_artist])
                })
                .collect(),
        ),
        WriteOp::UpsertArtist(artist) => (
            "UNWIND $rows AS row \
             MERGE (a:Artist {name: row.name}) \
             ON CREATE SET a.followers = row.followers \
             ON MATCH SET a.followers = COALESCE(row.followers, a.followers) \
             RETURN count(*) AS applied",
            vec![row([
                ("name", artist.name.clone().into()),
                ("followers", optional(artist.followers)),
            ])],
        ),
        WriteOp::UpsertAlbum(album) => (
            "UNWIND $rows AS row \
             MERGE (al:Album {name: row.album, artist: row.album_artist}) \
             ON CREATE SET al.release_date = row.release_date \
             ON MATCH SET al.release_date = COALESCE(row.release_date, al.release_date) \
             RETURN count(*) AS applied",
            vec![{
                let [name, artist] = album_row(&album.key);
                row([
                    name,
                    artist,
                    ("release_date", optional(album.release_date.clone())),
                ])
            }],
        ),
    }
}

async fn run_counted(txn: &mut Txn, q: Query) -> Result<usize, GraphError> {
    let mut stream = txn.execute(q).await.map_err(classify)?;
    let mut applied = 0;
    while let Some(row) = stream.next(txn.handle()).await.map_err(classify)? {
        applied += row.get::<i64>("applied").map_err(decode)?.max(0) as usize;
    }
    Ok(applied)
}

async fn execute_ops(txn: &mut Txn, batch: &WriteBatch) -> Result<BatchReport, GraphError> {
    let mut report = BatchReport::default();
    for op in batch.ops() {
        let (cypher, rows) = compile(op);
        let applied = run_counted(txn, query(cypher).param("rows", rows)).await?;
        debug!("{}: {} of {} rows applied", op.label(), applied, op.len());
        report.ops.push(OpReport {
            label: op.label(),
            rows: op.len(),
            applied,
        });
    }
    Ok(report)
}

fn summary_from_row(row: &Row) -> Result<TrackSummary, GraphError> {
    let mut artists: Vec<String> = row.get("artists").map_err(decode)?;
    artists.sort();
    artists.truncate(SUMMARY_ARTISTS);
    Ok(TrackSummary {
        track_id: row.get("track_id").map_err(decode)?,
        name: row.get("name").map_err(decode)?,
        popularity: row.get("popularity").map_err(decode)?,
        energy: row.get("energy").map_err(decode)?,
        danceability: row.get("danceability").map_err(decode)?,
        valence: row.get("valence").map_err(decode)?,
        artists,
        genre: row.get("genre").map_err(decode)?,
    })
}

/// Graph store talking to a Neo4j server over Bolt.
#[derive(Clone)]
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    /// Creates the driver's connection pool.
    ///
    /// Connections are opened lazily; use
    /// [`GraphStore::verify_connectivity`] to fail fast.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, GraphError> {
        info!(
            "Connecting to {} (database {})",
            config.uri, config.database
        );
        let driver_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| GraphError::Connectivity(format!("invalid connection settings: {}", e)))?;
        let graph = Graph::connect(driver_config).await.map_err(classify)?;
        Ok(Self { graph })
    }

    async fn fetch_all(&self, q: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(q).await.map_err(classify)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(classify)? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn fetch_one(&self, q: Query) -> Result<Option<Row>, GraphError> {
        Ok(self.fetch_all(q).await?.into_iter().next())
    }

    async fn count(&self, cypher: &str) -> Result<u64, GraphError> {
        match self.fetch_one(query(cypher)).await? {
            Some(row) => Ok(row.get::<i64>("n").map_err(decode)?.max(0) as u64),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn verify_connectivity(&self) -> Result<(), GraphError> {
        self.graph.run(query("RETURN 1")).await.map_err(|e| {
            match classify(e) {
                GraphError::Authentication(m) => GraphError::Authentication(m),
                other => GraphError::Connectivity(other.to_string()),
            }
        })
    }

    async fn apply_schema(&self, statements: &[SchemaStatement]) -> Vec<SchemaOutcome> {
        let mut outcomes = Vec::with_capacity(statements.len());
        for statement in statements {
            let outcome = match self.graph.run(query(statement.cypher)).await {
                Ok(()) => SchemaOutcome::Created(statement.name),
                Err(e) => {
                    let error = classify(e);
                    if error.is_already_exists() {
                        SchemaOutcome::AlreadyPresent(statement.name)
                    } else {
                        SchemaOutcome::Failed {
                            name: statement.name,
                            error,
                        }
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn execute(&self, batch: &WriteBatch) -> Result<BatchReport, GraphError> {
        if batch.is_empty() {
            return Ok(BatchReport::default());
        }
        let mut txn = self.graph.start_txn().await.map_err(classify)?;
        match execute_ops(&mut txn, batch).await {
            Ok(report) => {
                txn.commit().await.map_err(classify)?;
                Ok(report)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback failed after '{}': {}", err, rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn counts(&self) -> Result<GraphCounts, GraphError> {
        Ok(GraphCounts {
            tracks: self.count("MATCH (n:Track) RETURN count(n) AS n").await?,
            artists: self.count("MATCH (n:Artist) RETURN count(n) AS n").await?,
            albums: self.count("MATCH (n:Album) RETURN count(n) AS n").await?,
            genres: self.count("MATCH (n:Genre) RETURN count(n) AS n").await?,
            performs: self
                .count("MATCH ()-[r:PERFORMS]->() RETURN count(r) AS n")
                .await?,
            belongs_to: self
                .count("MATCH ()-[r:BELONGS_TO]->() RETURN count(r) AS n")
                .await?,
            created: self
                .count("MATCH ()-[r:CREATED]->() RETURN count(r) AS n")
                .await?,
            has_genre: self
                .count("MATCH ()-[r:HAS_GENRE]->() RETURN count(r) AS n")
                .await?,
            plays_genre: self
                .count("MATCH ()-[r:PLAYS_GENRE]->() RETURN count(r) AS n")
                .await?,
        })
    }

    async fn get_track(&self, track_id: &str) -> Result<Option<TrackDetails>, GraphError> {
        let q = query(
            "MATCH (t:Track {track_id: $track_id}) \
             RETURN properties(t) AS t, \
                    [(a:Artist)-[:PERFORMS]->(t) | a.name] AS artists, \
                    [(t)-[:BELONGS_TO]->(al:Album) | {name: al.name, artist: al.artist}] AS albums, \
                    [(t)-[:HAS_GENRE]->(g:Genre) | g.name] AS genres",
        )
        .param("track_id", track_id);
        let Some(row) = self.fetch_one(q).await? else {
            return Ok(None);
        };
        let mut artists: Vec<String> = row.get("artists").map_err(decode)?;
        artists.sort();
        let albums: Vec<AlbumKey> = row.get("albums").map_err(decode)?;
        let genres: Vec<String> = row.get("genres").map_err(decode)?;
        Ok(Some(TrackDetails {
            track: row.get("t").map_err(decode)?,
            artists,
            album: albums.into_iter().min(),
            genre_node: genres.into_iter().min(),
        }))
    }

    async fn find_tracks(&self, track_query: &TrackQuery) -> Result<Vec<TrackSummary>, GraphError> {
        let (head, filter, value) = match &track_query.filter {
            TrackFilter::All => ("MATCH (t:Track)", "", String::new()),
            TrackFilter::Search(term) => (
                "MATCH (t:Track)",
                "WHERE toLower(t.name) CONTAINS $value \
                    OR any(x IN artists WHERE toLower(x) CONTAINS $value) \
                    OR toLower(coalesce(genre, '')) CONTAINS $value",
                term.to_lowercase(),
            ),
            TrackFilter::Genre(genre) => (
                "MATCH (:Genre {name: $value})<-[:HAS_GENRE]-(t:Track)",
                "",
                genre.clone(),
            ),
            TrackFilter::Artist(artist) => (
                "MATCH (:Artist {name: $value})-[:PERFORMS]->(t:Track)",
                "",
                artist.clone(),
            ),
        };
        let cypher = format!(
            "{head} \
             WITH DISTINCT t, \
                  [(a:Artist)-[:PERFORMS]->(t) | a.name] AS artists, \
                  head([(t)-[:HAS_GENRE]->(g:Genre) | g.name]) AS genre \
             {filter} \
             RETURN t.track_id AS track_id, t.name AS name, \
                    coalesce(t.popularity, 0) AS popularity, \
                    coalesce(t.energy, 0.0) AS energy, \
                    coalesce(t.danceability, 0.0) AS danceability, \
                    coalesce(t.valence, 0.0) AS valence, \
                    artists, genre \
             ORDER BY popularity DESC, track_id \
             SKIP $offset LIMIT $limit"
        );
        let q = query(&cypher)
            .param("value", value)
            .param("offset", track_query.offset as i64)
            .param("limit", track_query.limit as i64);
        self.fetch_all(q)
            .await?
            .iter()
            .map(summary_from_row)
            .collect()
    }

    async fn get_artist(&self, name: &str) -> Result<Option<Artist>, GraphError> {
        let q = query(
            "MATCH (a:Artist {name: $name}) RETURN a.name AS name, a.followers AS followers",
        )
        .param("name", name);
        match self.fetch_one(q).await? {
            Some(row) => Ok(Some(Artist {
                name: row.get("name").map_err(decode)?,
                followers: row.get("followers").map_err(decode)?,
            })),
            None => Ok(None),
        }
    }

    async fn get_album(&self, key: &AlbumKey) -> Result<Option<Album>, GraphError> {
        let q = query(
            "MATCH (al:Album {name: $name, artist: $artist}) \
             RETURN al.release_date AS release_date",
        )
        .param("name", key.name.as_str())
        .param("artist", key.artist.as_str());
        match self.fetch_one(q).await? {
            Some(row) => Ok(Some(Album {
                key: key.clone(),
                release_date: row.get("release_date").map_err(decode)?,
            })),
            None => Ok(None),
        }
    }

    async fn list_artists(&self, limit: usize) -> Result<Vec<ArtistSummary>, GraphError> {
        let q = query(
            "MATCH (a:Artist) \
             OPTIONAL MATCH (a)-[:PERFORMS]->(t:Track) \
             RETURN a.name AS name, a.followers AS followers, count(t) AS track_count \
             ORDER BY track_count DESC, name \
             LIMIT $limit",
        )
        .param("limit", limit as i64);
        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(ArtistSummary {
                    name: row.get("name").map_err(decode)?,
                    followers: row.get("followers").map_err(decode)?,
                    track_count: row.get("track_count").map_err(decode)?,
                })
            })
            .collect()
    }

    async fn list_genres(&self) -> Result<Vec<String>, GraphError> {
        self.fetch_all(query("MATCH (g:Genre) RETURN g.name AS name ORDER BY name"))
            .await?
            .iter()
            .map(|row| row.get("name").map_err(decode))
            .collect()
    }

    async fn genre_statistics(&self, limit: usize) -> Result<Vec<GenreStatistics>, GraphError> {
        let q = query(
            "MATCH (g:Genre)<-[:HAS_GENRE]-(t:Track) \
             WITH g.name AS genre, t \
             RETURN genre, \
                    count(t) AS track_count, \
                    round(avg(t.popularity), 2) AS avg_popularity, \
                    round(avg(t.energy), 2) AS avg_energy, \
                    round(avg(t.danceability), 2) AS avg_danceability \
             ORDER BY track_count DESC, genre \
             LIMIT $limit",
        )
        .param("limit", limit as i64);
        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(GenreStatistics {
                    genre: row.get("genre").map_err(decode)?,
                    track_count: row.get("track_count").map_err(decode)?,
                    avg_popularity: row.get("avg_popularity").map_err(decode)?,
                    avg_energy: row.get("avg_energy").map_err(decode)?,
                    avg_danceability: row.get("avg_danceability").map_err(decode)?,
                })
            })
            .collect()
    }

    async fn artist_statistics(
        &self,
        min_tracks: u64,
        limit: usize,
    ) -> Result<Vec<ArtistStatistics>, GraphError> {
        let q = query(
            "MATCH (a:Artist)-[:PERFORMS]->(t:Track) \
             WITH a, count(t) AS track_count, avg(t.popularity) AS avg_popularity \
             WHERE track_count >= $min_tracks \
             RETURN a.name AS artist, track_count, round(avg_popularity, 2) AS avg_popularity \
             ORDER BY track_count DESC, artist \
             LIMIT $limit",
        )
        .param("min_tracks", min_tracks as i64)
        .param("limit", limit as i64);
        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(ArtistStatistics {
                    artist: row.get("artist").map_err(decode)?,
                    track_count: row.get("track_count").map_err(decode)?,
                    avg_popularity: row.get("avg_popularity").map_err(decode)?,
                })
            })
            .collect()
    }

    async fn collaborations(&self, limit: usize) -> Result<Vec<Collaboration>, GraphError> {
        let cypher = format!(
            "MATCH (a1:Artist)-[:PERFORMS]->(t:Track)<-[:PERFORMS]-(a2:Artist) \
             WHERE a1.name < a2.name \
             WITH a1.name AS artist1, a2.name AS artist2, t ORDER BY t.track_id \
             RETURN artist1, artist2, \
                    count(t) AS collaborations, \
                    collect(t.name)[..{COLLABORATION_SAMPLES}] AS sample_tracks \
             ORDER BY collaborations DESC, artist1, artist2 \
             LIMIT $limit"
        );
        let q = query(&cypher).param("limit", limit as i64);
        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(Collaboration {
                    artist1: row.get("artist1").map_err(decode)?,
                    artist2: row.get("artist2").map_err(decode)?,
                    collaborations: row.get("collaborations").map_err(decode)?,
                    sample_tracks: row.get("sample_tracks").map_err(decode)?,
                })
            })
            .collect()
    }

    async fn versatile_artists(&self, limit: usize) -> Result<Vec<VersatileArtist>, GraphError> {
        let q = query(
            "MATCH (a:Artist)-[:PLAYS_GENRE]->(g:Genre) \
             WITH a.name AS artist, g.name AS genre ORDER BY genre \
             WITH artist, collect(DISTINCT genre) AS genres \
             RETURN artist, genres, size(genres) AS genre_count \
             ORDER BY genre_count DESC, artist \
             LIMIT $limit",
        )
        .param("limit", limit as i64);
        self.fetch_all(q)
            .await?
            .iter()
            .map(|row| {
                Ok(VersatileArtist {
                    artist: row.get("artist").map_err(decode)?,
                    genres: row.get("genres").map_err(decode)?,
                    genre_count: row.get("genre_count").map_err(decode)?,
                })
            })
            .collect()
    }

    async fn update_track(
        &self,
        track_id: &str,
        update: &TrackUpdate,
    ) -> Result<Option<TrackNode>, GraphError> {
        let (set_clause, params) = update.compile("t")?;
        let cypher = format!(
            "MATCH (t:Track {{track_id: $track_id}}) {} RETURN properties(t) AS t",
            set_clause
        );
        let mut q = query(&cypher).param("track_id", track_id);
        for (name, value) in &params {
            q = q.param(name, bolt(value));
        }
        match self.fetch_one(q).await? {
            Some(row) => Ok(Some(row.get("t").map_err(decode)?)),
            None => Ok(None),
        }
    }

    async fn update_artist(
        &self,
        name: &str,
        followers: Option<i64>,
    ) -> Result<Option<Artist>, GraphError> {
        let q = query(
            "MATCH (a:Artist {name: $name}) \
             SET a.followers = COALESCE($followers, a.followers) \
             RETURN a.name AS name, a.followers AS followers",
        )
        .param("name", name)
        .param("followers", optional(followers));
        match self.fetch_one(q).await? {
            Some(row) => Ok(Some(Artist {
                name: row.get("name").map_err(decode)?,
                followers: row.get("followers").map_err(decode)?,
            })),
            None => Ok(None),
        }
    }

    async fn delete(&self, target: &DeleteTarget) -> Result<u64, GraphError> {
        let q = match target {
            DeleteTarget::Track(id) => query(
                "MATCH (n:Track {track_id: $key}) DETACH DELETE n RETURN count(n) AS n",
            )
            .param("key", id.as_str()),
            DeleteTarget::Artist(name) => query(
                "MATCH (n:Artist {name: $key}) DETACH DELETE n RETURN count(n) AS n",
            )
            .param("key", name.as_str()),
            DeleteTarget::Album(key) => query(
                "MATCH (n:Album {name: $name, artist: $artist}) \
                 DETACH DELETE n RETURN count(n) AS n",
            )
            .param("name", key.name.as_str())
            .param("artist", key.artist.as_str()),
        };
        match self.fetch_one(q).await? {
            Some(row) => Ok(row.get::<i64>("n").map_err(decode)?.max(0) as u64),
            None => Ok(0),
        }
    }
}
