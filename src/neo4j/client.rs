//! Neo4j client for the durable chart store

use anyhow::{Context, Result};
use chrono::Utc;
use neo4rs::{query, Graph};
use std::sync::Arc;
use uuid::Uuid;

use super::models::*;
use crate::synthesis::pair::CanonicalPair;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize constraints, indexes, and chart-type reference rows.
    ///
    /// The `chart_pair_key` uniqueness constraint is what makes chart
    /// creation race-safe: two concurrent creates of the same pair/type
    /// MERGE onto the same node instead of inserting duplicates.
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT person_id IF NOT EXISTS FOR (p:Person) REQUIRE p.id IS UNIQUE",
            "CREATE CONSTRAINT associate_id IF NOT EXISTS FOR (a:Associate) REQUIRE a.id IS UNIQUE",
            "CREATE CONSTRAINT organization_id IF NOT EXISTS FOR (o:Organization) REQUIRE o.id IS UNIQUE",
            "CREATE CONSTRAINT chart_type_id IF NOT EXISTS FOR (t:ChartType) REQUIRE t.id IS UNIQUE",
            "CREATE CONSTRAINT chart_id IF NOT EXISTS FOR (c:RelationshipChart) REQUIRE c.id IS UNIQUE",
            "CREATE CONSTRAINT chart_pair_key IF NOT EXISTS FOR (c:RelationshipChart) REQUIRE c.pair_key IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX chart_entity_low IF NOT EXISTS FOR (c:RelationshipChart) ON (c.entity_low)",
            "CREATE INDEX chart_entity_high IF NOT EXISTS FOR (c:RelationshipChart) ON (c.entity_high)",
            "CREATE INDEX chart_type IF NOT EXISTS FOR (c:RelationshipChart) ON (c.chart_type_id)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        // Seed the two chart-type reference rows
        for chart_type in [ChartType::Synastry, ChartType::Composite] {
            let q = query(
                r#"
                MERGE (t:ChartType {id: $id})
                ON CREATE SET t.name = $name
                "#,
            )
            .param("id", chart_type.id())
            .param("name", chart_type.display_name());

            self.graph
                .run(q)
                .await
                .context("Failed to seed chart types")?;
        }

        Ok(())
    }

    /// Derived key enforcing the one-chart-per-pair-per-type invariant
    fn pair_key(chart_type: ChartType, pair: &CanonicalPair) -> String {
        format!("{}:{}:{}", chart_type.id(), pair.low(), pair.high())
    }

    // ========================================================================
    // Source entity lookups
    // ========================================================================

    /// Get a person by id
    pub async fn get_person(&self, id: &str) -> Result<Option<PersonNode>> {
        let q = query(
            r#"
            MATCH (p:Person {id: $id})
            RETURN p
            "#,
        )
        .param("id", id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("p")?;
            Ok(Some(Self::node_to_person(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Get an associate by id
    pub async fn get_associate(&self, id: &str) -> Result<Option<AssociateNode>> {
        let q = query(
            r#"
            MATCH (a:Associate {id: $id})
            RETURN a
            "#,
        )
        .param("id", id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("a")?;
            Ok(Some(Self::node_to_associate(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Get an organization by id
    pub async fn get_organization(&self, id: &str) -> Result<Option<OrganizationNode>> {
        let q = query(
            r#"
            MATCH (o:Organization {id: $id})
            RETURN o
            "#,
        )
        .param("id", id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("o")?;
            Ok(Some(Self::node_to_organization(&node)?))
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // Chart-type reference data
    // ========================================================================

    /// Get a chart type by numeric id
    pub async fn get_chart_type(&self, id: i64) -> Result<Option<ChartTypeNode>> {
        let q = query(
            r#"
            MATCH (t:ChartType {id: $id})
            RETURN t
            "#,
        )
        .param("id", id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("t")?;
            Ok(Some(ChartTypeNode {
                id: node.get("id")?,
                name: node.get("name")?,
            }))
        } else {
            Ok(None)
        }
    }

    /// List all chart types
    pub async fn list_chart_types(&self) -> Result<Vec<ChartTypeNode>> {
        let q = query(
            r#"
            MATCH (t:ChartType)
            RETURN t
            ORDER BY t.id
            "#,
        );

        let mut result = self.graph.execute(q).await?;
        let mut types = Vec::new();

        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("t")?;
            types.push(ChartTypeNode {
                id: node.get("id")?,
                name: node.get("name")?,
            });
        }

        Ok(types)
    }

    // ========================================================================
    // Relationship charts
    // ========================================================================

    /// Find the chart for a canonical pair and chart type
    pub async fn find_chart_by_pair(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
    ) -> Result<Option<RelationshipChartNode>> {
        let q = query(
            r#"
            MATCH (c:RelationshipChart {pair_key: $pair_key})
            RETURN c
            "#,
        )
        .param("pair_key", Self::pair_key(chart_type, pair));

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("c")?;
            Ok(Some(Self::node_to_chart(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Find every chart referencing an entity id, on either side of the pair
    pub async fn find_charts_by_entity(
        &self,
        entity_id: &str,
    ) -> Result<Vec<RelationshipChartNode>> {
        let q = query(
            r#"
            MATCH (c:RelationshipChart)
            WHERE c.entity_low = $id OR c.entity_high = $id
            RETURN c
            ORDER BY c.created_at
            "#,
        )
        .param("id", entity_id);

        let mut result = self.graph.execute(q).await?;
        let mut charts = Vec::new();

        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("c")?;
            charts.push(Self::node_to_chart(&node)?);
        }

        Ok(charts)
    }

    /// Create the chart for a canonical pair and chart type.
    ///
    /// MERGE on the unique pair key: if a concurrent request already created
    /// this chart, ON CREATE is skipped and the winner's row comes back.
    pub async fn create_chart(
        &self,
        chart_type: ChartType,
        pair: &CanonicalPair,
        chart_data: &serde_json::Value,
    ) -> Result<RelationshipChartNode> {
        let now = Utc::now();
        let q = query(
            r#"
            MERGE (c:RelationshipChart {pair_key: $pair_key})
            ON CREATE SET
                c.id = $id,
                c.chart_type_id = $chart_type_id,
                c.entity_low = $entity_low,
                c.entity_high = $entity_high,
                c.chart_data = $chart_data,
                c.created_at = $created_at,
                c.updated_at = $created_at
            RETURN c
            "#,
        )
        .param("pair_key", Self::pair_key(chart_type, pair))
        .param("id", Uuid::new_v4().to_string())
        .param("chart_type_id", chart_type.id())
        .param("entity_low", pair.low())
        .param("entity_high", pair.high())
        .param("chart_data", serde_json::to_string(chart_data)?)
        .param("created_at", now.to_rfc3339());

        let mut result = self.graph.execute(q).await?;
        let row = result
            .next()
            .await?
            .context("MERGE returned no chart row")?;
        let node: neo4rs::Node = row.get("c")?;
        Self::node_to_chart(&node)
    }

    /// Replace a chart's payload wholesale
    pub async fn update_chart_payload(
        &self,
        chart_id: Uuid,
        chart_data: &serde_json::Value,
    ) -> Result<RelationshipChartNode> {
        let q = query(
            r#"
            MATCH (c:RelationshipChart {id: $id})
            SET c.chart_data = $chart_data,
                c.updated_at = $updated_at
            RETURN c
            "#,
        )
        .param("id", chart_id.to_string())
        .param("chart_data", serde_json::to_string(chart_data)?)
        .param("updated_at", Utc::now().to_rfc3339());

        let mut result = self.graph.execute(q).await?;
        let row = result
            .next()
            .await?
            .with_context(|| format!("Chart {} not found for update", chart_id))?;
        let node: neo4rs::Node = row.get("c")?;
        Self::node_to_chart(&node)
    }

    /// Check store connectivity
    pub async fn health_check(&self) -> Result<bool> {
        match self.graph.run(query("RETURN 1")).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    // ========================================================================
    // Row mapping
    // ========================================================================

    fn node_to_person(node: &neo4rs::Node) -> Result<PersonNode> {
        Ok(PersonNode {
            id: node.get("id")?,
            full_name: node.get("full_name")?,
            birth_date: node.get("birth_date").ok(),
            birth_time: node.get("birth_time").ok(),
            birth_latitude: node.get("birth_latitude").ok(),
            birth_longitude: node.get("birth_longitude").ok(),
            utc_offset: node.get("utc_offset").ok(),
        })
    }

    fn node_to_associate(node: &neo4rs::Node) -> Result<AssociateNode> {
        Ok(AssociateNode {
            id: node.get("id")?,
            associate_name: node.get("associate_name")?,
            owner_person_id: node.get("owner_person_id").ok(),
            birth_date: node.get("birth_date").ok(),
            birth_time: node.get("birth_time").ok(),
            birth_latitude: node.get("birth_latitude").ok(),
            birth_longitude: node.get("birth_longitude").ok(),
            utc_offset: node.get("utc_offset").ok(),
        })
    }

    fn node_to_organization(node: &neo4rs::Node) -> Result<OrganizationNode> {
        Ok(OrganizationNode {
            id: node.get("id")?,
            organization_name: node.get("organization_name")?,
            founding_date: node.get("founding_date").ok(),
            founding_time: node.get("founding_time").ok(),
            latitude: node.get("latitude").ok(),
            longitude: node.get("longitude").ok(),
            utc_offset: node.get("utc_offset").ok(),
        })
    }

    fn node_to_chart(node: &neo4rs::Node) -> Result<RelationshipChartNode> {
        let chart_data: String = node.get("chart_data")?;
        Ok(RelationshipChartNode {
            id: node.get::<String>("id")?.parse()?,
            chart_type_id: node.get("chart_type_id")?,
            entity_ids: [node.get("entity_low")?, node.get("entity_high")?],
            chart_data: serde_json::from_str(&chart_data)
                .context("Stored chart_data is not valid JSON")?,
            created_at: node
                .get::<String>("created_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
            updated_at: node
                .get::<String>("updated_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
