//! Integration tests for the catalog repositories.
//!
//! - Team creation with owner membership
//! - Artist name resolution and artist links
//! - LPM and ISRC CRUD, team scoping, unique violations
//! - Paginated list with search, filter and sort whitelisting
//! - Cascade delete from teams

use assert_matches::assert_matches;
use sqlx::PgPool;
use sonora_core::table::{ListQuery, SortDir};
use sonora_core::types::DbId;
use sonora_db::models::artist::{ArtistFilters, CreateArtist};
use sonora_db::models::isrc_song::{CreateIsrcSong, IsrcSongFilters, UpdateIsrcSong};
use sonora_db::models::lpm_product::{CreateLpmProduct, LpmFilters, UpdateLpmProduct};
use sonora_db::models::user::CreateUser;
use sonora_db::repositories::{
    ArtistRepo, IsrcSongRepo, LpmProductRepo, TeamMemberRepo, TeamRepo, UserRepo,
};
use sonora_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_team(pool: &PgPool, slug: &str) -> DbId {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{slug}@example.com"),
            name: "Owner".to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap();
    TeamRepo::create_with_owner(pool, "Label", slug, user.id)
        .await
        .unwrap()
        .id
}

fn new_song(isrc: &str, title: &str) -> CreateIsrcSong {
    CreateIsrcSong {
        isrc: isrc.to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

fn new_product(upc: &str, release_title: &str) -> CreateLpmProduct {
    CreateLpmProduct {
        upc: upc.to_string(),
        release_title: Some(release_title.to_string()),
        ..Default::default()
    }
}

fn sorted_by(sort: &str, dir: SortDir) -> ListQuery {
    ListQuery {
        sort: Some(sort.to_string()),
        dir: Some(dir),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Teams and artists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_team_creator_is_owner(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let members = TeamMemberRepo::list(&pool, team_id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, "owner");
    assert_eq!(TeamMemberRepo::count_owners(&pool, team_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resolve_names_is_case_insensitive(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let first = ArtistRepo::resolve_names(&pool, team_id, &["Rosalía".to_string(), "Bad Bunny".to_string()])
        .await
        .unwrap();
    let second = ArtistRepo::resolve_names(&pool, team_id, &["BAD BUNNY".to_string(), " ".to_string()])
        .await
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second, vec![first[1]]);

    let page = ArtistRepo::list(&pool, team_id, &ListQuery::default(), &ArtistFilters::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_artist_name_is_unique_violation(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let input = CreateArtist {
        name: "Nathy Peluso".to_string(),
        spotify_id: None,
        apple_music_id: None,
        country: Some("ar".to_string()),
    };
    let artist = ArtistRepo::create(&pool, team_id, &input).await.unwrap();
    assert_eq!(artist.country.as_deref(), Some("AR"));

    let err = ArtistRepo::create(
        &pool,
        team_id,
        &CreateArtist {
            name: "nathy peluso".to_string(),
            ..input
        },
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
}

// ---------------------------------------------------------------------------
// ISRC songs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_isrc_song_crud_with_artists(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let mut input = new_song("ESA011900001", "Malamente");
    input.artists = vec!["Rosalía".to_string()];

    let song = IsrcSongRepo::create(&pool, team_id, &input).await.unwrap();
    assert_eq!(song.artists, vec!["Rosalía".to_string()]);
    assert!(!song.explicit);

    let updated = IsrcSongRepo::update(
        &pool,
        team_id,
        song.id,
        &UpdateIsrcSong {
            genre: Some("Flamenco".to_string()),
            artists: Some(vec!["Rosalía".to_string(), "El Guincho".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("song exists");
    assert_eq!(updated.title, "Malamente");
    assert_eq!(updated.genre.as_deref(), Some("Flamenco"));
    assert_eq!(updated.artists, vec!["El Guincho".to_string(), "Rosalía".to_string()]);

    assert!(IsrcSongRepo::delete(&pool, team_id, song.id).await.unwrap());
    assert!(IsrcSongRepo::find_by_id(&pool, team_id, song.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_isrc_song_is_scoped_to_team(pool: PgPool) {
    let team_a = new_team(&pool, "team-a").await;
    let team_b = new_team(&pool, "team-b").await;
    let song = IsrcSongRepo::create(&pool, team_a, &new_song("ESA011900001", "Malamente"))
        .await
        .unwrap();

    assert!(IsrcSongRepo::find_by_id(&pool, team_b, song.id).await.unwrap().is_none());
    assert!(!IsrcSongRepo::delete(&pool, team_b, song.id).await.unwrap());

    // Same ISRC is fine in another team.
    IsrcSongRepo::create(&pool, team_b, &new_song("ESA011900001", "Malamente"))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_isrc_in_team_violates_uq(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    IsrcSongRepo::create(&pool, team_id, &new_song("ESA011900001", "One"))
        .await
        .unwrap();
    let err = IsrcSongRepo::create(&pool, team_id, &new_song("ESA011900001", "Two"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_isrc_songs_team_isrc"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_isrc_list_filters_and_sorts(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    for (isrc, title, genre) in [
        ("ESA011900001", "Bizcochito", "Pop"),
        ("ESA011900002", "Aute Cuture", "Pop"),
        ("ESA011900003", "Pienso en tu mirá", "Flamenco"),
    ] {
        let mut input = new_song(isrc, title);
        input.genre = Some(genre.to_string());
        IsrcSongRepo::create(&pool, team_id, &input).await.unwrap();
    }

    let filters = IsrcSongFilters {
        genre: Some("Pop".to_string()),
        ..Default::default()
    };
    let page = IsrcSongRepo::list(&pool, team_id, &sorted_by("title", SortDir::Asc), &filters)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let titles: Vec<&str> = page.items.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Aute Cuture", "Bizcochito"]);

    let search = ListQuery {
        search: Some("mirá".to_string()),
        ..Default::default()
    };
    let page = IsrcSongRepo::list(&pool, team_id, &search, &IsrcSongFilters::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].isrc, "ESA011900003");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_rejects_unknown_sort_column(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let result = IsrcSongRepo::list(
        &pool,
        team_id,
        &sorted_by("title; DROP TABLE isrc_songs", SortDir::Asc),
        &IsrcSongFilters::default(),
    )
    .await;
    assert_matches!(result, Err(DbError::Core(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_paginates(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    for i in 0..7 {
        IsrcSongRepo::create(&pool, team_id, &new_song(&format!("ESA01190000{i}"), &format!("Song {i}")))
            .await
            .unwrap();
    }

    let query = ListQuery {
        page: Some(3),
        page_size: Some(3),
        sort: Some("isrc".to_string()),
        ..Default::default()
    };
    let page = IsrcSongRepo::list(&pool, team_id, &query, &IsrcSongFilters::default())
        .await
        .unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].isrc, "ESA011900006");
}

// ---------------------------------------------------------------------------
// LPM products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lpm_product_crud(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let mut input = new_product("036000291452", "El Mal Querer");
    input.track_number = Some(1);
    input.artists = vec!["Rosalía".to_string()];

    let product = LpmProductRepo::create(&pool, team_id, &input).await.unwrap();
    assert_eq!(product.upc, "036000291452");
    assert_eq!(product.track_number, Some(1));
    assert_eq!(product.artists, vec!["Rosalía".to_string()]);

    let updated = LpmProductRepo::update(
        &pool,
        team_id,
        product.id,
        &UpdateLpmProduct {
            label_name: Some("Columbia".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("product exists");
    assert_eq!(updated.label_name.as_deref(), Some("Columbia"));
    assert_eq!(updated.release_title.as_deref(), Some("El Mal Querer"));
    assert_eq!(updated.artists, vec!["Rosalía".to_string()]);

    let filters = LpmFilters {
        upc: Some("036000291452".to_string()),
        ..Default::default()
    };
    let rows = LpmProductRepo::export(&pool, team_id, &ListQuery::default(), &filters)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    assert!(LpmProductRepo::delete(&pool, team_id, product.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_team_delete_cascades_catalog(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let mut song = new_song("ESA011900001", "Malamente");
    song.artists = vec!["Rosalía".to_string()];
    IsrcSongRepo::create(&pool, team_id, &song).await.unwrap();
    LpmProductRepo::create(&pool, team_id, &new_product("036000291452", "El Mal Querer"))
        .await
        .unwrap();

    assert!(TeamRepo::delete(&pool, team_id).await.unwrap());

    for table in ["artists", "isrc_songs", "isrc_song_artists", "lpm_products", "team_members"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} should be empty after team delete");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_artist_delete_removes_links_only(pool: PgPool) {
    let team_id = new_team(&pool, "acme").await;
    let mut input = new_song("ESA011900001", "Malamente");
    input.artists = vec!["Rosalía".to_string()];
    let song = IsrcSongRepo::create(&pool, team_id, &input).await.unwrap();

    let ids = ArtistRepo::resolve_names(&pool, team_id, &["rosalía".to_string()]).await.unwrap();
    assert!(ArtistRepo::delete(&pool, team_id, ids[0]).await.unwrap());

    let song = IsrcSongRepo::find_by_id(&pool, team_id, song.id)
        .await
        .unwrap()
        .expect("song survives");
    assert!(song.artists.is_empty());
}
