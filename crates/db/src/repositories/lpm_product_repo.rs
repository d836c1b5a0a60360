//! Repository for the `lpm_products` table and its artist links.

use sqlx::{PgConnection, PgPool};
use sonora_core::batching::{BatchConfig, BulkSummary};
use sonora_core::table::{resolve_sort, ListQuery, Paginated, MAX_EXPORT_ROWS};
use sonora_core::types::DbId;

use crate::bulk::run_in_batches;
use crate::error::DbError;
use crate::filter::{fetch_for_export, fetch_page, BindValue, Filter};
use crate::models::lpm_product::{CreateLpmProduct, LpmFilters, LpmProduct, UpdateLpmProduct};
use crate::repositories::ArtistRepo;

/// Data columns, in table order.
const FIELDS: &str = "\
     upc, catalog_number, release_title, release_version, release_artist, label_name, \
     release_type, release_format, genre, subgenre, release_date, original_release_date, \
     pre_order_date, p_line_year, p_line_text, c_line_year, c_line_text, territories, \
     excluded_territories, price_tier, explicit_content, language, total_volumes, \
     total_tracks, artwork_file, dsp_exclusions, aggregator, delivery_status, notes, \
     isrc, track_title, track_version, track_artist, featured_artists, track_number, \
     volume_number, duration_seconds, track_genre, track_language, track_explicit, \
     preview_start_seconds, composers, lyricists, arrangers, producers, publishers, \
     iswc, track_p_line_year, track_p_line_text, audio_file, recording_year, \
     recording_country, available_separately, primary_artist_spotify_id, \
     primary_artist_apple_id";

/// Linked artist names, alphabetical.
const ARTISTS: &str = "COALESCE((SELECT array_agg(a.name ORDER BY a.name) \
                       FROM lpm_product_artists pa JOIN artists a ON a.id = pa.artist_id \
                       WHERE pa.lpm_product_id = lpm_products.id), '{}') AS artists";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &[
    "upc",
    "catalog_number",
    "release_title",
    "release_artist",
    "label_name",
    "release_date",
    "genre",
    "aggregator",
    "isrc",
    "track_title",
    "track_number",
    "created_at",
    "updated_at",
];

const SEARCH_COLUMNS: &[&str] = &[
    "upc",
    "catalog_number",
    "release_title",
    "release_artist",
    "label_name",
    "isrc",
    "track_title",
    "track_artist",
];

fn select_columns() -> String {
    format!("id, team_id, {FIELDS}, {ARTISTS}, created_at, updated_at")
}

/// Provides CRUD and bulk operations for LPM products.
pub struct LpmProductRepo;

impl LpmProductRepo {
    /// Insert a product and link its artists, returning the created row.
    pub async fn create(
        pool: &PgPool,
        team_id: DbId,
        input: &CreateLpmProduct,
    ) -> Result<LpmProduct, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = Self::insert_row(&mut tx, team_id, input).await?;
        Self::replace_artists(&mut tx, team_id, id, &input.artists).await?;
        let product = Self::find_in(&mut tx, team_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;
        Ok(product)
    }

    /// Find a product by ID within a team.
    pub async fn find_by_id(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
    ) -> Result<Option<LpmProduct>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::find_in(&mut conn, team_id, id).await
    }

    /// One page of products matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &LpmFilters,
    ) -> Result<Paginated<LpmProduct>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let filter = build_filter(team_id, query, filters);
        let page = query.page();
        let (items, total) = fetch_page(
            pool,
            &select_columns(),
            "lpm_products",
            &filter,
            sort,
            query.dir(),
            page,
        )
        .await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Every product matching the query (capped), for CSV export.
    pub async fn export(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &LpmFilters,
    ) -> Result<Vec<LpmProduct>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let filter = build_filter(team_id, query, filters);
        let rows = fetch_for_export(
            pool,
            &select_columns(),
            "lpm_products",
            &filter,
            sort,
            query.dir(),
            MAX_EXPORT_ROWS,
        )
        .await?;
        Ok(rows)
    }

    /// Update a product. Only non-`None` fields in `input` are applied;
    /// `artists`, when present, replaces every link.
    ///
    /// Returns `None` if no row with the given `id` exists in the team.
    pub async fn update(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
        input: &UpdateLpmProduct,
    ) -> Result<Option<LpmProduct>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = "UPDATE lpm_products SET
                upc = COALESCE($3, upc),
                catalog_number = COALESCE($4, catalog_number),
                release_title = COALESCE($5, release_title),
                release_version = COALESCE($6, release_version),
                release_artist = COALESCE($7, release_artist),
                label_name = COALESCE($8, label_name),
                release_type = COALESCE($9, release_type),
                release_format = COALESCE($10, release_format),
                genre = COALESCE($11, genre),
                subgenre = COALESCE($12, subgenre),
                release_date = COALESCE($13, release_date),
                original_release_date = COALESCE($14, original_release_date),
                pre_order_date = COALESCE($15, pre_order_date),
                p_line_year = COALESCE($16, p_line_year),
                p_line_text = COALESCE($17, p_line_text),
                c_line_year = COALESCE($18, c_line_year),
                c_line_text = COALESCE($19, c_line_text),
                territories = COALESCE($20, territories),
                excluded_territories = COALESCE($21, excluded_territories),
                price_tier = COALESCE($22, price_tier),
                explicit_content = COALESCE($23, explicit_content),
                language = COALESCE($24, language),
                total_volumes = COALESCE($25, total_volumes),
                total_tracks = COALESCE($26, total_tracks),
                artwork_file = COALESCE($27, artwork_file),
                dsp_exclusions = COALESCE($28, dsp_exclusions),
                aggregator = COALESCE($29, aggregator),
                delivery_status = COALESCE($30, delivery_status),
                notes = COALESCE($31, notes),
                isrc = COALESCE($32, isrc),
                track_title = COALESCE($33, track_title),
                track_version = COALESCE($34, track_version),
                track_artist = COALESCE($35, track_artist),
                featured_artists = COALESCE($36, featured_artists),
                track_number = COALESCE($37, track_number),
                volume_number = COALESCE($38, volume_number),
                duration_seconds = COALESCE($39, duration_seconds),
                track_genre = COALESCE($40, track_genre),
                track_language = COALESCE($41, track_language),
                track_explicit = COALESCE($42, track_explicit),
                preview_start_seconds = COALESCE($43, preview_start_seconds),
                composers = COALESCE($44, composers),
                lyricists = COALESCE($45, lyricists),
                arrangers = COALESCE($46, arrangers),
                producers = COALESCE($47, producers),
                publishers = COALESCE($48, publishers),
                iswc = COALESCE($49, iswc),
                track_p_line_year = COALESCE($50, track_p_line_year),
                track_p_line_text = COALESCE($51, track_p_line_text),
                audio_file = COALESCE($52, audio_file),
                recording_year = COALESCE($53, recording_year),
                recording_country = COALESCE($54, recording_country),
                available_separately = COALESCE($55, available_separately),
                primary_artist_spotify_id = COALESCE($56, primary_artist_spotify_id),
                primary_artist_apple_id = COALESCE($57, primary_artist_apple_id)
             WHERE team_id = $1 AND id = $2
             RETURNING id";
        let updated: Option<DbId> = sqlx::query_scalar(query)
            .bind(team_id)
            .bind(id)
            .bind(&input.upc)
            .bind(&input.catalog_number)
            .bind(&input.release_title)
            .bind(&input.release_version)
            .bind(&input.release_artist)
            .bind(&input.label_name)
            .bind(&input.release_type)
            .bind(&input.release_format)
            .bind(&input.genre)
            .bind(&input.subgenre)
            .bind(&input.release_date)
            .bind(&input.original_release_date)
            .bind(&input.pre_order_date)
            .bind(&input.p_line_year)
            .bind(&input.p_line_text)
            .bind(&input.c_line_year)
            .bind(&input.c_line_text)
            .bind(&input.territories)
            .bind(&input.excluded_territories)
            .bind(&input.price_tier)
            .bind(&input.explicit_content)
            .bind(&input.language)
            .bind(&input.total_volumes)
            .bind(&input.total_tracks)
            .bind(&input.artwork_file)
            .bind(&input.dsp_exclusions)
            .bind(&input.aggregator)
            .bind(&input.delivery_status)
            .bind(&input.notes)
            .bind(&input.isrc)
            .bind(&input.track_title)
            .bind(&input.track_version)
            .bind(&input.track_artist)
            .bind(&input.featured_artists)
            .bind(&input.track_number)
            .bind(&input.volume_number)
            .bind(&input.duration_seconds)
            .bind(&input.track_genre)
            .bind(&input.track_language)
            .bind(&input.track_explicit)
            .bind(&input.preview_start_seconds)
            .bind(&input.composers)
            .bind(&input.lyricists)
            .bind(&input.arrangers)
            .bind(&input.producers)
            .bind(&input.publishers)
            .bind(&input.iswc)
            .bind(&input.track_p_line_year)
            .bind(&input.track_p_line_text)
            .bind(&input.audio_file)
            .bind(&input.recording_year)
            .bind(&input.recording_country)
            .bind(&input.available_separately)
            .bind(&input.primary_artist_spotify_id)
            .bind(&input.primary_artist_apple_id)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_none() {
            return Ok(None);
        }

        if let Some(artists) = &input.artists {
            Self::replace_artists(&mut tx, team_id, id, artists).await?;
        }
        let product = Self::find_in(&mut tx, team_id, id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Delete a product. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lpm_products WHERE team_id = $1 AND id = $2")
            .bind(team_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert many products, `config.batch_size` per transaction.
    pub async fn bulk_create(
        pool: &PgPool,
        team_id: DbId,
        config: &BatchConfig,
        inputs: &[CreateLpmProduct],
    ) -> Result<BulkSummary, DbError> {
        run_in_batches(config, inputs, |_, chunk| Self::insert_chunk(pool, team_id, chunk)).await
    }

    async fn insert_chunk(
        pool: &PgPool,
        team_id: DbId,
        chunk: &[CreateLpmProduct],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for input in chunk {
            let id = Self::insert_row(&mut tx, team_id, input).await?;
            Self::replace_artists(&mut tx, team_id, id, &input.artists).await?;
        }
        tx.commit().await?;
        Ok(chunk.len())
    }

    async fn insert_row(
        conn: &mut PgConnection,
        team_id: DbId,
        input: &CreateLpmProduct,
    ) -> Result<DbId, sqlx::Error> {
        let query = format!(
            "INSERT INTO lpm_products (team_id, {FIELDS})
             VALUES ($1,
                $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27,
                $28, $29, $30, $31, $32, $33, $34, $35, $36, $37, $38, $39,
                $40, $41, $42, $43, $44, $45, $46, $47, $48, $49, $50, $51,
                $52, $53, $54, $55, $56)
             RETURNING id"
        );
        sqlx::query_scalar(&query)
            .bind(team_id)
            .bind(&input.upc)
            .bind(&input.catalog_number)
            .bind(&input.release_title)
            .bind(&input.release_version)
            .bind(&input.release_artist)
            .bind(&input.label_name)
            .bind(&input.release_type)
            .bind(&input.release_format)
            .bind(&input.genre)
            .bind(&input.subgenre)
            .bind(&input.release_date)
            .bind(&input.original_release_date)
            .bind(&input.pre_order_date)
            .bind(&input.p_line_year)
            .bind(&input.p_line_text)
            .bind(&input.c_line_year)
            .bind(&input.c_line_text)
            .bind(&input.territories)
            .bind(&input.excluded_territories)
            .bind(&input.price_tier)
            .bind(&input.explicit_content)
            .bind(&input.language)
            .bind(&input.total_volumes)
            .bind(&input.total_tracks)
            .bind(&input.artwork_file)
            .bind(&input.dsp_exclusions)
            .bind(&input.aggregator)
            .bind(&input.delivery_status)
            .bind(&input.notes)
            .bind(&input.isrc)
            .bind(&input.track_title)
            .bind(&input.track_version)
            .bind(&input.track_artist)
            .bind(&input.featured_artists)
            .bind(&input.track_number)
            .bind(&input.volume_number)
            .bind(&input.duration_seconds)
            .bind(&input.track_genre)
            .bind(&input.track_language)
            .bind(&input.track_explicit)
            .bind(&input.preview_start_seconds)
            .bind(&input.composers)
            .bind(&input.lyricists)
            .bind(&input.arrangers)
            .bind(&input.producers)
            .bind(&input.publishers)
            .bind(&input.iswc)
            .bind(&input.track_p_line_year)
            .bind(&input.track_p_line_text)
            .bind(&input.audio_file)
            .bind(&input.recording_year)
            .bind(&input.recording_country)
            .bind(&input.available_separately)
            .bind(&input.primary_artist_spotify_id)
            .bind(&input.primary_artist_apple_id)
            .fetch_one(&mut *conn)
            .await
    }

    async fn replace_artists(
        conn: &mut PgConnection,
        team_id: DbId,
        id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM lpm_product_artists WHERE lpm_product_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let artist_ids = ArtistRepo::resolve_names_in(conn, team_id, names).await?;
        for artist_id in artist_ids {
            sqlx::query(
                "INSERT INTO lpm_product_artists (lpm_product_id, artist_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(artist_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn find_in(
        conn: &mut PgConnection,
        team_id: DbId,
        id: DbId,
    ) -> Result<Option<LpmProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM lpm_products WHERE team_id = $1 AND id = $2",
            select_columns()
        );
        sqlx::query_as::<_, LpmProduct>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}

fn build_filter(team_id: DbId, query: &ListQuery, filters: &LpmFilters) -> Filter {
    let text = |v: &Option<String>| v.as_ref().map(|s| BindValue::Text(s.clone()));
    let mut filter = Filter::for_team(team_id);
    filter
        .eq_opt("release_type", text(&filters.release_type))
        .eq_opt("genre", text(&filters.genre))
        .eq_opt("aggregator", text(&filters.aggregator))
        .eq_opt("upc", text(&filters.upc))
        .search(SEARCH_COLUMNS, query.search_pattern());
    if let Some(from) = filters.release_from {
        filter.push("release_date >= ?", BindValue::Date(from));
    }
    if let Some(to) = filters.release_to {
        filter.push("release_date <= ?", BindValue::Date(to));
    }
    filter
}
